use crate::utils::IdRejection;

pub struct TransactionIdValidator;

impl TransactionIdValidator {
    /// Structural sanity check for a candidate transaction identifier.
    ///
    /// Strips every non-digit character, then rejects identifiers that are
    /// too short (<10 digits), too long (>18 digits), a single repeated
    /// digit, or more than 80% zeros (both strong OCR-artifact signals).
    /// On success returns the cleaned all-digit string.
    ///
    /// Pure and idempotent: the same gate runs at extraction time and again
    /// immediately before a ledger commit.
    pub fn validate(candidate: &str) -> Result<String, IdRejection> {
        let clean: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();

        if clean.len() < 10 {
            return Err(IdRejection::TooShort(clean.len()));
        }
        if clean.len() > 18 {
            return Err(IdRejection::TooLong(clean.len()));
        }

        let first = clean.chars().next().unwrap_or('0');
        if clean.chars().all(|c| c == first) {
            return Err(IdRejection::DegenerateDigits(clean));
        }

        let zeros = clean.chars().filter(|c| *c == '0').count();
        if zeros as f64 > clean.len() as f64 * 0.8 {
            return Err(IdRejection::ExcessZeros(clean));
        }

        Ok(clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_ten_digit_id() {
        assert_eq!(
            TransactionIdValidator::validate("1234567890"),
            Ok("1234567890".to_string())
        );
    }

    #[test]
    fn test_strips_non_digit_noise() {
        assert_eq!(
            TransactionIdValidator::validate("4001-2345-6789"),
            Ok("400123456789".to_string())
        );
    }

    #[test]
    fn test_rejects_short_ids() {
        assert_eq!(
            TransactionIdValidator::validate("123456789"),
            Err(IdRejection::TooShort(9))
        );
        assert_eq!(
            TransactionIdValidator::validate(""),
            Err(IdRejection::TooShort(0))
        );
    }

    #[test]
    fn test_rejects_long_ids() {
        assert_eq!(
            TransactionIdValidator::validate("1234567890123456789"),
            Err(IdRejection::TooLong(19))
        );
    }

    #[test]
    fn test_rejects_single_repeated_digit() {
        assert_eq!(
            TransactionIdValidator::validate("777777777777777777"),
            Err(IdRejection::DegenerateDigits("777777777777777777".to_string()))
        );
    }

    #[test]
    fn test_rejects_excess_zeros() {
        // 9 zeros out of 10 digits
        assert_eq!(
            TransactionIdValidator::validate("1000000000"),
            Err(IdRejection::ExcessZeros("1000000000".to_string()))
        );
    }

    #[test]
    fn test_eight_of_ten_zeros_is_accepted() {
        // exactly 80% zeros does not cross the >80% bar
        assert_eq!(
            TransactionIdValidator::validate("1200000000"),
            Ok("1200000000".to_string())
        );
    }

    #[test]
    fn test_idempotent_on_cleaned_output() {
        let cleaned = TransactionIdValidator::validate("Txn 4001 2345 6789").unwrap();
        assert_eq!(TransactionIdValidator::validate(&cleaned), Ok(cleaned));
    }
}
