use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::models::{ConfidenceTier, ExtractionResult, IdCandidate};
use crate::processing::text::{assess_ocr_quality, normalize_text};
use crate::validation::TransactionIdValidator;

// Ordered pattern rules per field, most specific first. Transaction-id rules
// carry a base score because every rule runs and candidates are ranked;
// the other fields resolve by per-field precedence policies instead.
lazy_static! {
    static ref TRANSACTION_ID_RULES: Vec<(Regex, ConfidenceTier, i32)> = vec![
        (
            Regex::new(r"(?i)Transaction\s*ID\s*[:\s]*(\d{10,18})").unwrap(),
            ConfidenceTier::VeryHigh,
            100,
        ),
        (
            Regex::new(r"(?i)Bill\s*Number\s*[:\s]*(\d{10,18})").unwrap(),
            ConfidenceTier::High,
            90,
        ),
        (
            Regex::new(r"(?i)ID\s*[:\s]*(\d{10,18})").unwrap(),
            ConfidenceTier::Medium,
            70,
        ),
        // Any bare 10-18 digit run
        (Regex::new(r"(\d{10,18})").unwrap(), ConfidenceTier::Low, 50),
        // Standard UPI reference length
        (Regex::new(r"(\d{12,16})").unwrap(), ConfidenceTier::Medium, 60),
    ];

    static ref DATE_RULES: Vec<Regex> = vec![
        // 13-Jul-2025
        Regex::new(r"(?i)(\d{1,2}[-/]\w{3}[-/]\d{4})").unwrap(),
        // 13/07/2025 or 13-07-2025
        Regex::new(r"(\d{1,2}[-/]\d{1,2}[-/]\d{4})").unwrap(),
        Regex::new(r"(?i)Time[:\s]*(\d{1,2}[-/]\w{3}[-/]\d{4})").unwrap(),
        Regex::new(r"(?i)Date[:\s]*(\d{1,2}[-/]\w{3}[-/]\d{4})").unwrap(),
    ];

    static ref TIME_RULES: Vec<Regex> = vec![
        // 04:50 PM
        Regex::new(r"(?i)(\d{1,2}:\d{2}\s*[AP]M)").unwrap(),
        // hour:minute and meridiem as separate groups
        Regex::new(r"(?i)(\d{1,2}:\d{2})\s*([AP]M)").unwrap(),
        Regex::new(r"(?i)Time[:\s]*(\d{1,2}:\d{2}\s*[AP]M)").unwrap(),
    ];

    // UPI with OCR-spaced letters tolerated
    static ref MODE_RULE: Regex = Regex::new(r"(?i)UPI|UP\s*I|U\s*P\s*I").unwrap();

    static ref AMOUNT_RULES: Vec<(Regex, ConfidenceTier)> = vec![
        (
            Regex::new(r"(?i)Total\s*Amount[:\s]*UPI[:\s=]*(\d{1,6})").unwrap(),
            ConfidenceTier::VeryHigh,
        ),
        (
            Regex::new(r"(?i)UPI[:\s=]+(\d{1,6})").unwrap(),
            ConfidenceTier::High,
        ),
        (
            Regex::new(r"(?i)Amount[:\s]*(\d{1,6})").unwrap(),
            ConfidenceTier::Medium,
        ),
        (
            Regex::new(r"(?i)Total\s*Amount[:\s]*(\d{1,6})").unwrap(),
            ConfidenceTier::Medium,
        ),
        (
            Regex::new(r"(?i)Mode\s*Total\s*Amount[:\s]*(\d{1,6})").unwrap(),
            ConfidenceTier::VeryHigh,
        ),
        (
            Regex::new(r"₹\s*(\d{1,6})").unwrap(),
            ConfidenceTier::Low,
        ),
        (
            Regex::new(r"(?i)Rs\.?\s*(\d{1,6})").unwrap(),
            ConfidenceTier::Low,
        ),
    ];

    static ref VPA_RULES: Vec<(Regex, ConfidenceTier)> = vec![
        (
            Regex::new(r"([a-zA-Z0-9._-]{6,}@[a-zA-Z0-9]{2,})").unwrap(),
            ConfidenceTier::High,
        ),
        // numeric handles (phone-number style)
        (
            Regex::new(r"(\d{8,}@[a-zA-Z0-9]+)").unwrap(),
            ConfidenceTier::High,
        ),
        (
            Regex::new(r"(?i)Payer[:\s]*([a-zA-Z0-9._-]+@[a-zA-Z0-9]+)").unwrap(),
            ConfidenceTier::VeryHigh,
        ),
        (
            Regex::new(r"(?i)VPA[:\s]*([a-zA-Z0-9._-]+@[a-zA-Z0-9]+)").unwrap(),
            ConfidenceTier::VeryHigh,
        ),
    ];
}

const ID_CONTEXT_WORDS: [&str; 4] = ["transaction", "bill", "id", "number"];
const AMOUNT_CONTEXT_WORDS: [&str; 4] = ["amount", "total", "rs", "₹"];

/// Should a new amount candidate replace the held one? Labeled
/// high-specificity matches always win over generic symbol-prefixed ones,
/// regardless of scan order.
pub fn amount_replaces(held: Option<ConfidenceTier>, new: ConfidenceTier) -> bool {
    match held {
        None => true,
        Some(held) => {
            matches!(new, ConfidenceTier::VeryHigh | ConfidenceTier::High)
                || (new == ConfidenceTier::Medium
                    && matches!(held, ConfidenceTier::Low | ConfidenceTier::VeryLow))
        }
    }
}

/// Should a new VPA candidate replace the held one? Any VeryHigh/High match
/// overwrites; lower tiers only fill an empty slot. Deliberately not the
/// same policy as `amount_replaces` (see DESIGN.md).
pub fn vpa_replaces(held: Option<ConfidenceTier>, new: ConfidenceTier) -> bool {
    held.is_none() || matches!(new, ConfidenceTier::VeryHigh | ConfidenceTier::High)
}

/// ±20 characters of lowercased text around a match, clamped to char
/// boundaries (the text may carry multi-byte currency symbols).
fn context_window(text: &str, position: usize, match_len: usize) -> String {
    let mut start = position.saturating_sub(20);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (position + match_len + 20).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_lowercase()
}

/// Position/context score for one transaction-id candidate: early mentions
/// and label-adjacent matches score up, amount-adjacent matches score down
/// (a weaker negative signal than an explicit label is a positive one).
fn score_id_candidate(text: &str, position: usize, match_len: usize, base_score: i32) -> i32 {
    let mut score = base_score;

    if (position as f64) < text.len() as f64 * 0.3 {
        score += 10;
    }

    let context = context_window(text, position, match_len);
    if ID_CONTEXT_WORDS.iter().any(|w| context.contains(w)) {
        score += 15;
    }
    if AMOUNT_CONTEXT_WORDS.iter().any(|w| context.contains(w)) {
        score -= 10;
    }

    score
}

/// Rank transaction-id candidates by score, descending. The sort is stable,
/// so rule order (most specific first) breaks ties.
fn rank_id_candidates(mut candidates: Vec<IdCandidate>) -> Vec<IdCandidate> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// FieldExtractor turns one combined OCR text blob into a structured
/// extraction result, field by field.
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn extract(raw_text: &str) -> ExtractionResult {
        let text = normalize_text(raw_text);

        let mut result = ExtractionResult {
            ocr_quality: Some(assess_ocr_quality(&text)),
            ..Default::default()
        };

        Self::extract_transaction_id(&text, &mut result);

        if let Some(date) = Self::extract_date(&text) {
            result.date = date;
        }
        if let Some(time) = Self::extract_time(&text) {
            result.time = time;
        }
        if MODE_RULE.is_match(&text) {
            result.transaction_mode = "UPI".to_string();
        }

        Self::extract_amount(&text, &mut result);
        Self::extract_vpa(&text, &mut result);

        result
    }

    /// Run every transaction-id rule, validate every match, rank the
    /// survivors. The top candidate becomes the resolved field; the whole
    /// ranked list is kept for diagnostics.
    fn extract_transaction_id(text: &str, result: &mut ExtractionResult) {
        let mut candidates = Vec::new();

        for (pattern, confidence, base_score) in TRANSACTION_ID_RULES.iter() {
            for caps in pattern.captures_iter(text) {
                let m = match caps.get(1) {
                    Some(m) => m,
                    None => continue,
                };
                match TransactionIdValidator::validate(m.as_str()) {
                    Ok(clean_id) => {
                        let position = m.start();
                        let score =
                            score_id_candidate(text, position, m.as_str().len(), *base_score);
                        candidates.push(IdCandidate {
                            id: clean_id,
                            confidence: *confidence,
                            score,
                            position,
                            context: context_window(text, position, m.as_str().len()),
                        });
                    }
                    Err(rejection) => {
                        result
                            .validation_errors
                            .push(format!("Invalid Transaction ID {}: {}", m.as_str(), rejection));
                    }
                }
            }
        }

        let candidates = rank_id_candidates(candidates);
        if let Some(best) = candidates.first() {
            info!(
                "Best transaction ID: {} (score {}, confidence {})",
                best.id, best.score, best.confidence
            );
            result.transaction_id = best.id.clone();
            result.transaction_id_confidence = Some(best.confidence);
            result.validation_score = best.score;
        }
        result.candidates = candidates;
    }

    /// First date rule that matches wins; no scoring.
    fn extract_date(text: &str) -> Option<String> {
        for pattern in DATE_RULES.iter() {
            if let Some(caps) = pattern.captures(text) {
                if let Some(m) = caps.get(1) {
                    return Some(m.as_str().to_string());
                }
            }
        }
        None
    }

    /// First time rule that matches wins; split hour/meridiem groups are
    /// rejoined with a single space.
    fn extract_time(text: &str) -> Option<String> {
        for pattern in TIME_RULES.iter() {
            if let Some(caps) = pattern.captures(text) {
                let first = caps.get(1)?;
                return Some(match caps.get(2) {
                    Some(second) => format!("{} {}", first.as_str(), second.as_str()),
                    None => first.as_str().to_string(),
                });
            }
        }
        None
    }

    fn extract_amount(text: &str, result: &mut ExtractionResult) {
        let mut held: Option<ConfidenceTier> = None;

        for (pattern, confidence) in AMOUNT_RULES.iter() {
            let m = match pattern.captures(text).and_then(|caps| caps.get(1)) {
                Some(m) => m,
                None => continue,
            };
            let amount = m.as_str();
            let value: i64 = match amount.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            // Digit-count cap disambiguates amounts from 10+-digit ids
            if (1..=1_000_000).contains(&value) && amount.len() <= 7 && amount.len() < 10 {
                if amount_replaces(held, *confidence) {
                    debug!("Amount candidate {} ({})", amount, confidence);
                    held = Some(*confidence);
                    result.amount = amount.to_string();
                    result.amount_confidence = Some(*confidence);
                }
            }
        }
    }

    fn extract_vpa(text: &str, result: &mut ExtractionResult) {
        let mut held: Option<ConfidenceTier> = None;

        for (pattern, confidence) in VPA_RULES.iter() {
            for caps in pattern.captures_iter(text) {
                let m = match caps.get(1) {
                    Some(m) => m,
                    None => continue,
                };
                let vpa = m.as_str();
                if vpa.contains('@') && vpa.chars().count() >= 8 {
                    if vpa_replaces(held, *confidence) {
                        debug!("VPA candidate {} ({})", vpa, confidence);
                        held = Some(*confidence);
                        result.payer_vpa = vpa.to_string();
                        result.vpa_confidence = Some(*confidence);
                    }
                }
            }
        }
    }
}
