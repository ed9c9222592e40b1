use crate::models::OcrQuality;

/// Collapse whitespace runs into single spaces and trim the ends. Nothing
/// else: case and punctuation are preserved, case-insensitive matching is
/// the extractors' job.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_readable_token(token: &str) -> bool {
    let len = token.chars().count();
    (1..=25).contains(&len)
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-'))
}

/// Rate how readable a block of OCR text is: the fraction of
/// whitespace-separated tokens that look like words rather than garble.
/// Advisory only; extraction runs whatever the verdict.
pub fn assess_ocr_quality(text: &str) -> OcrQuality {
    if text.trim().chars().count() < 5 {
        return OcrQuality::VeryPoor;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return OcrQuality::VeryPoor;
    }

    let readable = words.iter().filter(|w| is_readable_token(w)).count();
    let ratio = readable as f64 / words.len() as f64;

    if ratio > 0.6 {
        OcrQuality::Good
    } else if ratio > 0.4 {
        OcrQuality::Fair
    } else if ratio > 0.2 {
        OcrQuality::Poor
    } else {
        OcrQuality::VeryPoor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Transaction \t ID:\n 400123456789  "),
            "Transaction ID: 400123456789"
        );
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_preserves_case_and_punctuation() {
        assert_eq!(normalize_text("Payer: Alice@OkBank!"), "Payer: Alice@OkBank!");
    }

    #[test]
    fn test_short_text_is_very_poor() {
        assert_eq!(assess_ocr_quality(""), OcrQuality::VeryPoor);
        assert_eq!(assess_ocr_quality("abc"), OcrQuality::VeryPoor);
    }

    #[test]
    fn test_clean_text_is_good() {
        let text = "Transaction ID: 400123456789 Amount 500 alice@okbank";
        assert_eq!(assess_ocr_quality(text), OcrQuality::Good);
    }

    #[test]
    fn test_garbled_text_rates_poorly() {
        // tokens with characters outside the readable set
        let text = "##$% |||| ^^&* ((()) ~~!! ¢¢¢¢ ?>?< ;;:: {}{} ][][";
        assert_eq!(assess_ocr_quality(text), OcrQuality::VeryPoor);
    }

    #[test]
    fn test_mixed_text_is_fair() {
        // 5 readable of 10 tokens -> ratio 0.5
        let text = "alice bob carol dave erin #$ |% ^& (* )!";
        assert_eq!(assess_ocr_quality(text), OcrQuality::Fair);
    }
}
