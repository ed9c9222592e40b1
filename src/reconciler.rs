use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use log::{error, info, warn};

use crate::ledger::LedgerStore;
use crate::matching::RecordResolver;
use crate::models::{ConfidenceTier, ImageReport, LedgerRecord, Outcome, RunSummary};
use crate::processing::{FieldExtractor, OcrProcessor};
use crate::utils::ReconcileError;
use crate::validation::TransactionIdValidator;

const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Mutable state for one batch run. Only the reconciler touches it; in
/// particular `committed_rows` is how rows settled earlier in the run stay
/// excluded from later matching without re-querying the ledger source.
#[derive(Debug, Default)]
pub struct RunContext {
    pub matched: usize,
    pub updated: usize,
    pub errors: usize,
    pub committed_rows: HashSet<usize>,
}

/// Reconciler drives the whole pipeline over a batch of screenshots:
/// OCR, extraction, ledger matching, commit, reporting.
pub struct Reconciler {
    commit_delay: Duration,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler {
            // courtesy pause toward the external ledger sink
            commit_delay: Duration::from_millis(500),
        }
    }

    pub fn with_commit_delay(commit_delay: Duration) -> Self {
        Reconciler { commit_delay }
    }

    /// Process every supported image in a directory against the ledger.
    /// The ledger is read once up front; a single image failing never
    /// aborts the batch. Returns the per-image reports and the aggregate
    /// summary.
    pub fn process_batch<L: LedgerStore>(
        &self,
        images_dir: &Path,
        ledger: &mut L,
    ) -> Result<(Vec<ImageReport>, RunSummary), ReconcileError> {
        let records = ledger.pending_records()?;
        if records.is_empty() {
            warn!("Ledger has no records; nothing can match");
        }

        let mut image_files: Vec<_> = std::fs::read_dir(images_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        image_files.sort();

        info!("Found {} image files to process", image_files.len());

        let mut ctx = RunContext::default();
        let mut reports = Vec::with_capacity(image_files.len());

        for path in &image_files {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            info!("Processing: {}", filename);

            let report = match self.process_image(path, &filename, &records, ledger, &mut ctx) {
                Ok(report) => report,
                Err(e) => {
                    error!("Error processing {}: {}", filename, e);
                    ctx.errors += 1;
                    ImageReport {
                        filename: filename.clone(),
                        outcome: Outcome::ProcessingError {
                            message: e.to_string(),
                        },
                        extraction: Default::default(),
                        raw_text_preview: String::new(),
                        processed_at: timestamp(),
                    }
                }
            };
            reports.push(report);
        }

        let summary = summarize(&reports, &ctx);
        info!(
            "Batch done: {} processed, {} matched, {} updated, {} errors, {:.1}% success",
            summary.processed,
            summary.matched,
            summary.updated,
            summary.errors,
            summary.success_rate()
        );
        Ok((reports, summary))
    }

    fn process_image<L: LedgerStore>(
        &self,
        path: &Path,
        filename: &str,
        records: &[LedgerRecord],
        ledger: &mut L,
        ctx: &mut RunContext,
    ) -> Result<ImageReport, ReconcileError> {
        let texts = OcrProcessor::gather_texts(path);
        let combined = texts.join(" ");
        self.reconcile_text(filename, &combined, records, ledger, ctx)
    }

    /// Everything after OCR: extract fields from the combined text, resolve
    /// against the ledger snapshot, and commit when the match and the
    /// re-validated identifier both hold up.
    pub fn reconcile_text<L: LedgerStore>(
        &self,
        filename: &str,
        combined_text: &str,
        records: &[LedgerRecord],
        ledger: &mut L,
        ctx: &mut RunContext,
    ) -> Result<ImageReport, ReconcileError> {
        let extraction = FieldExtractor::extract(combined_text);
        let matched = RecordResolver::find_match(&extraction, records, &ctx.committed_rows);

        let outcome = match matched {
            Some(m) if !extraction.transaction_id.is_empty() => {
                ctx.matched += 1;
                // The identifier must independently re-pass validation
                // before anything is written.
                match TransactionIdValidator::validate(&extraction.transaction_id) {
                    Ok(clean_id) => {
                        if ledger.set_transaction_id(m.row, &clean_id)? {
                            ctx.updated += 1;
                            ctx.committed_rows.insert(m.row);
                            info!("Committed {} to ledger row {}", clean_id, m.row);
                            if !self.commit_delay.is_zero() {
                                std::thread::sleep(self.commit_delay);
                            }
                            Outcome::Updated {
                                row: m.row,
                                id: clean_id,
                            }
                        } else {
                            Outcome::CommitRejected { row: m.row }
                        }
                    }
                    Err(rejection) => Outcome::InvalidIdentifier {
                        reason: rejection.to_string(),
                    },
                }
            }
            None => Outcome::NoMatch,
            Some(_) => Outcome::NoIdentifier,
        };

        Ok(ImageReport {
            filename: filename.to_string(),
            outcome,
            raw_text_preview: combined_text.chars().take(1000).collect(),
            extraction,
            processed_at: timestamp(),
        })
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Roll the per-image reports and run counters up into one summary.
pub fn summarize(reports: &[ImageReport], ctx: &RunContext) -> RunSummary {
    let tier_count = |tier: ConfidenceTier| {
        reports
            .iter()
            .filter(|r| r.extraction.transaction_id_confidence == Some(tier))
            .count()
    };
    RunSummary {
        processed: reports.len(),
        matched: ctx.matched,
        updated: ctx.updated,
        errors: ctx.errors,
        very_high_confidence: tier_count(ConfidenceTier::VeryHigh),
        high_confidence: tier_count(ConfidenceTier::High),
        medium_confidence: tier_count(ConfidenceTier::Medium),
        low_confidence: tier_count(ConfidenceTier::Low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory ledger standing in for the external sink.
    struct MemoryLedger {
        records: Vec<LedgerRecord>,
        reject_writes: bool,
    }

    impl MemoryLedger {
        fn new(records: Vec<LedgerRecord>) -> Self {
            MemoryLedger {
                records,
                reject_writes: false,
            }
        }
    }

    impl LedgerStore for MemoryLedger {
        fn pending_records(&self) -> Result<Vec<LedgerRecord>, ReconcileError> {
            Ok(self.records.clone())
        }

        fn set_transaction_id(
            &mut self,
            row: usize,
            transaction_id: &str,
        ) -> Result<bool, ReconcileError> {
            if self.reject_writes {
                return Ok(false);
            }
            match self.records.iter_mut().find(|r| r.row == row) {
                Some(record) => {
                    record.transaction_id = transaction_id.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn record(row: usize, vpa: &str, amount: &str, date: &str) -> LedgerRecord {
        LedgerRecord {
            row,
            transaction_id: String::new(),
            payer_vpa: vpa.to_string(),
            amount: amount.to_string(),
            date: date.to_string(),
        }
    }

    fn quiet_reconciler() -> Reconciler {
        Reconciler::with_commit_delay(Duration::ZERO)
    }

    const GOOD_TEXT: &str =
        "Payment Successful Transaction ID: 400123456789 Total Amount: UPI= 500 \
         Payer: alice@okbank 13-Jul-2025 04:50 PM via UPI";

    #[test]
    fn test_single_image_commits_exactly_once() {
        let records = vec![
            record(2, "alice@okbank", "500.00", "13/07/2025"),
            record(3, "bob@okbank", "9999", "01/01/2024"),
        ];
        let mut ledger = MemoryLedger::new(records.clone());
        let mut ctx = RunContext::default();

        let report = quiet_reconciler()
            .reconcile_text("shot1.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
            .unwrap();

        assert_eq!(
            report.outcome,
            Outcome::Updated {
                row: 2,
                id: "400123456789".to_string()
            }
        );
        assert_eq!(ledger.records[0].transaction_id, "400123456789");
        assert_eq!(ledger.records[1].transaction_id, "");
        assert_eq!(ctx.matched, 1);
        assert_eq!(ctx.updated, 1);
    }

    #[test]
    fn test_no_record_is_matched_twice_in_one_run() {
        let records = vec![record(2, "alice@okbank", "500.00", "13/07/2025")];
        let mut ledger = MemoryLedger::new(records.clone());
        let mut ctx = RunContext::default();
        let reconciler = quiet_reconciler();

        let first = reconciler
            .reconcile_text("shot1.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
            .unwrap();
        assert!(matches!(first.outcome, Outcome::Updated { row: 2, .. }));

        // Same evidence again: the snapshot still shows row 2 pending, but
        // the run context must exclude it.
        let second = reconciler
            .reconcile_text("shot2.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
            .unwrap();
        assert_eq!(second.outcome, Outcome::NoMatch);
        assert_eq!(ctx.updated, 1);
    }

    #[test]
    fn test_match_without_identifier_reports_no_identifier() {
        let records = vec![record(2, "alice@okbank", "500.00", "13/07/2025")];
        let mut ledger = MemoryLedger::new(records.clone());
        let mut ctx = RunContext::default();

        let text = "Total Amount: UPI= 500 Payer: alice@okbank 13-Jul-2025";
        let report = quiet_reconciler()
            .reconcile_text("shot.png", text, &records, &mut ledger, &mut ctx)
            .unwrap();

        assert_eq!(report.outcome, Outcome::NoIdentifier);
        assert_eq!(ledger.records[0].transaction_id, "");
        assert_eq!(ctx.matched, 0);
    }

    #[test]
    fn test_no_match_outcome() {
        let records = vec![record(2, "bob@other", "9999", "01/01/2020")];
        let mut ledger = MemoryLedger::new(records.clone());
        let mut ctx = RunContext::default();

        let report = quiet_reconciler()
            .reconcile_text("shot.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
            .unwrap();

        assert_eq!(report.outcome, Outcome::NoMatch);
        assert_eq!(ctx.updated, 0);
    }

    #[test]
    fn test_rejected_write_is_reported_not_fatal() {
        let records = vec![record(2, "alice@okbank", "500.00", "13/07/2025")];
        let mut ledger = MemoryLedger::new(records.clone());
        ledger.reject_writes = true;
        let mut ctx = RunContext::default();

        let report = quiet_reconciler()
            .reconcile_text("shot.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
            .unwrap();

        assert_eq!(report.outcome, Outcome::CommitRejected { row: 2 });
        assert_eq!(ctx.matched, 1);
        assert_eq!(ctx.updated, 0);
        assert!(ctx.committed_rows.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            record(2, "alice@okbank", "500.00", "13/07/2025"),
            record(3, "bob@okbank", "750", "14/07/2025"),
        ];
        let mut ledger = MemoryLedger::new(records.clone());
        let mut ctx = RunContext::default();
        let reconciler = quiet_reconciler();

        let mut reports = Vec::new();
        reports.push(
            reconciler
                .reconcile_text("a.png", GOOD_TEXT, &records, &mut ledger, &mut ctx)
                .unwrap(),
        );
        reports.push(
            reconciler
                .reconcile_text("b.png", "garbled", &records, &mut ledger, &mut ctx)
                .unwrap(),
        );

        let summary = summarize(&reports, &ctx);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.very_high_confidence, 1);
        assert!((summary.success_rate() - 50.0).abs() < 1e-9);
    }
}
