/// Levenshtein distance, two-row dynamic programming.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Edit-distance similarity ratio in [0, 1] between two lowercased strings.
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Similarity score in [0, 100] between a ledger-side VPA and an extracted
/// VPA.
///
/// Exact equality scores 100. A containment (either side, candidate at
/// least 8 chars) is floored at 95 since OCR routinely clips a handle's
/// head or tail. When both sides carry exactly one `@`, user and domain
/// parts are compared separately and combined 70/30: the user part is the
/// discriminating half of a handle, while domains repeat across payers.
pub fn vpa_match_score(ledger_vpa: &str, extracted_vpa: &str) -> f64 {
    if ledger_vpa.is_empty() || extracted_vpa.is_empty() {
        return 0.0;
    }

    if ledger_vpa == extracted_vpa {
        return 100.0;
    }

    let ledger_lower = ledger_vpa.to_lowercase();
    let extracted_lower = extracted_vpa.to_lowercase();
    let similarity = similarity_ratio(&ledger_lower, &extracted_lower);

    if extracted_vpa.chars().count() >= 8 && ledger_lower.contains(&extracted_lower) {
        return (similarity * 100.0).max(95.0);
    }
    if ledger_vpa.chars().count() >= 8 && extracted_lower.contains(&ledger_lower) {
        return (similarity * 100.0).max(95.0);
    }

    let ledger_parts: Vec<&str> = ledger_vpa.split('@').collect();
    let extracted_parts: Vec<&str> = extracted_vpa.split('@').collect();
    if ledger_parts.len() == 2 && extracted_parts.len() == 2 {
        let user_similarity = similarity_ratio(
            &ledger_parts[0].to_lowercase(),
            &extracted_parts[0].to_lowercase(),
        );
        let domain_similarity = similarity_ratio(
            &ledger_parts[1].to_lowercase(),
            &extracted_parts[1].to_lowercase(),
        );
        return (user_similarity * 0.7 + domain_similarity * 0.3) * 100.0;
    }

    similarity * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_100() {
        assert_eq!(vpa_match_score("alice@bank", "alice@bank"), 100.0);
    }

    #[test]
    fn test_near_match_is_partial() {
        let score = vpa_match_score("alice@bank", "alice@bankx");
        assert!(score > 0.0 && score < 100.0);
    }

    #[test]
    fn test_missing_side_is_zero() {
        assert_eq!(vpa_match_score("", "x"), 0.0);
        assert_eq!(vpa_match_score("alice@bank", ""), 0.0);
    }

    #[test]
    fn test_containment_floors_at_95() {
        // extracted handle clipped by OCR, contained in the ledger VPA
        let score = vpa_match_score("alice.kumar@okbank", "kumar@okbank");
        assert!(score >= 95.0);
    }

    #[test]
    fn test_split_weighs_user_70_domain_30() {
        // usernames 50% similar, identical domains: 0.7*0.5 + 0.3*1.0 = 0.65
        let score = vpa_match_score("abcd@okbank", "abxy@okbank");
        assert!((score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn test_case_insensitive_equality_scores_100() {
        let score = vpa_match_score("Alice@OkBank", "alice@okbank");
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }
}
