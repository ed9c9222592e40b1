use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::warn;
use regex::Regex;

// Formats seen across screenshots and ledger rows, tried in order. The
// two-digit-year formats must come before the four-digit ones: chrono's %Y
// accepts 1-4 digit years, so "13/07/25" would otherwise parse as year 25.
const DATE_FORMATS: [&str; 7] = [
    "%d-%b-%Y", // 13-Jul-2025
    "%d/%m/%y", // 13/07/25
    "%m/%d/%y", // 7/31/25 (ledger export format)
    "%d/%m/%Y", // 13/07/2025
    "%d-%m-%Y", // 13-07-2025
    "%m/%d/%Y", // 07/13/2025
    "%Y-%m-%d", // 2025-07-13
];

lazy_static! {
    // Ledger datetime cells like "7/31/25 12:33 PM"
    static ref DATETIME_RE: Regex =
        Regex::new(r"(\d{1,2}/\d{1,2}/\d{2,4})\s+\d{1,2}:\d{2}").unwrap();
    // Last-resort day/month/year split
    static ref LOOSE_DATE_RE: Regex = Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})").unwrap();
}

/// Parse a date string of unknown format into a calendar date.
///
/// Tries the known formats in turn, then datetime cells, then a loose
/// day/month/year regex that retries with day and month swapped when the
/// first reading is not a valid calendar date. Returns None (with a warn
/// log) when nothing fits.
pub fn normalize_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Some(date);
        }
    }

    if let Some(caps) = DATETIME_RE.captures(date_str) {
        let date_part = &caps[1];
        for format in ["%m/%d/%y", "%m/%d/%Y"] {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
                return Some(date);
            }
        }
    }

    // Take only the leading token so a trailing time-of-day cannot confuse
    // the loose match.
    let head = date_str.split_whitespace().next().unwrap_or(date_str);
    if let Some(caps) = LOOSE_DATE_RE.captures(head) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let mut year: i32 = caps[3].parse().ok()?;
        if caps[3].len() == 2 {
            year += 2000;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
        // US ordering: the first field was the month
        if let Some(date) = NaiveDate::from_ymd_opt(year, day, month) {
            return Some(date);
        }
    }

    warn!("Could not parse date: {}", date_str);
    None
}
