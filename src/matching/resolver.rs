use std::collections::HashSet;

use log::{debug, info, warn};

use crate::matching::dates::normalize_date;
use crate::matching::fuzzy::vpa_match_score;
use crate::models::{ExtractionResult, LedgerRecord, MatchResult};

const MATCH_THRESHOLD: f64 = 50.0;

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// RecordResolver reconciles one extraction against the pending ledger
/// records and selects the single best correspondence, if any.
pub struct RecordResolver;

impl RecordResolver {
    /// Score every eligible record and pick the best one at or above the
    /// threshold. Eligible means: transaction id still unset and not
    /// already committed during this run. A later record must strictly
    /// exceed the running best to displace it, so ties resolve to scan
    /// order.
    pub fn find_match(
        extraction: &ExtractionResult,
        records: &[LedgerRecord],
        committed_rows: &HashSet<usize>,
    ) -> Option<MatchResult> {
        let extracted_vpa = extraction.payer_vpa.trim();
        let extracted_amount = parse_amount(&extraction.amount);
        let extracted_date = normalize_date(&extraction.date);

        debug!(
            "Matching vpa={:?} amount={:?} date={:?}",
            extracted_vpa, extracted_amount, extracted_date
        );

        let mut best: Option<MatchResult> = None;

        for record in records {
            if record.is_settled() || committed_rows.contains(&record.row) {
                continue;
            }

            let score = Self::score_record(record, extracted_vpa, extracted_amount, extracted_date);

            let best_score = best.map(|b| b.score).unwrap_or(0.0);
            if score > best_score && score >= MATCH_THRESHOLD {
                info!("Candidate match at row {} with score {:.1}", record.row, score);
                best = Some(MatchResult {
                    row: record.row,
                    score,
                });
            }
        }

        match best {
            Some(result) => {
                info!("Match found: row {} (score {:.1})", result.row, result.score);
                Some(result)
            }
            None => {
                warn!("No ledger record crossed the match threshold");
                None
            }
        }
    }

    /// One record's total match score: capped, weighted contributions from
    /// VPA similarity, amount proximity, and date proximity.
    fn score_record(
        record: &LedgerRecord,
        extracted_vpa: &str,
        extracted_amount: Option<f64>,
        extracted_date: Option<chrono::NaiveDate>,
    ) -> f64 {
        let mut score = 0.0;

        let ledger_vpa = record.payer_vpa.trim();
        if !ledger_vpa.is_empty() && !extracted_vpa.is_empty() {
            let vpa_score = vpa_match_score(ledger_vpa, extracted_vpa);
            if vpa_score >= 60.0 {
                score += vpa_score * 0.4;
            } else if vpa_score >= 40.0 {
                score += vpa_score * 0.2;
            }
        } else if !extracted_vpa.is_empty() {
            // Extracted evidence with no ledger-side value to compare against
            score += 10.0;
        }

        if let (Some(ledger_amount), Some(extracted_amount)) =
            (parse_amount(&record.amount), extracted_amount)
        {
            if extracted_amount > 0.0 {
                let diff = (ledger_amount - extracted_amount).abs();
                if diff == 0.0 {
                    score += 40.0;
                } else if diff <= 5.0 {
                    score += 35.0 - diff * 2.0;
                } else if diff <= 10.0 {
                    score += 25.0 - diff;
                }
            }
        }

        if let (Some(ledger_date), Some(extracted_date)) =
            (normalize_date(&record.date), extracted_date)
        {
            let delta = (extracted_date - ledger_date).num_days().abs();
            if delta == 0 {
                score += 20.0;
            } else if delta <= 3 {
                score += 15.0 - delta as f64 * 2.0;
            } else if delta <= 7 {
                score += 5.0;
            }
        }

        score
    }
}
