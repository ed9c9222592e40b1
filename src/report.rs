use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::info;
use serde::Serialize;

use crate::models::{ImageReport, Outcome, RunSummary};
use crate::utils::ReconcileError;

#[derive(Serialize)]
struct RunReport<'a> {
    summary: &'a RunSummary,
    images: &'a [ImageReport],
}

/// Write the full run report (summary + every per-image row) as pretty JSON
/// next to the given directory, timestamped so runs never overwrite each
/// other. Returns the path written.
pub fn export_json(
    output_dir: &Path,
    reports: &[ImageReport],
    summary: &RunSummary,
) -> Result<PathBuf, ReconcileError> {
    let filename = format!(
        "reconciliation_log_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    );
    let path = output_dir.join(filename);

    let serialized = serde_json::to_string_pretty(&RunReport {
        summary,
        images: reports,
    })?;
    fs::write(&path, serialized)
        .map_err(|e| ReconcileError::Report(format!("Failed to write report: {}", e)))?;

    info!("Run report saved to {}", path.display());
    Ok(path)
}

/// Print the human-reviewable run report: one line per image plus the
/// aggregate summary.
pub fn print_report(reports: &[ImageReport], summary: &RunSummary) {
    println!("\n===============================================");
    println!("       RECONCILIATION RUN REPORT");
    println!("===============================================\n");

    println!(
        "{:<30} {:<20} {:<12} {:<6} OUTCOME",
        "FILENAME", "TRANSACTION ID", "CONFIDENCE", "SCORE"
    );
    println!("{}", "-".repeat(100));
    for report in reports {
        let confidence = report
            .extraction
            .transaction_id_confidence
            .map(|c| c.label())
            .unwrap_or("-");
        let id = if report.extraction.transaction_id.is_empty() {
            "-"
        } else {
            &report.extraction.transaction_id
        };
        println!(
            "{:<30} {:<20} {:<12} {:<6} {}",
            truncate(&report.filename, 28),
            id,
            confidence,
            report.extraction.validation_score,
            report.outcome
        );
    }

    println!("\nSUMMARY:");
    println!("  Total images processed:  {}", summary.processed);
    println!("  Records matched:         {}", summary.matched);
    println!("  Ledger rows updated:     {}", summary.updated);
    println!("  Processing errors:       {}", summary.errors);
    println!("  Very High confidence:    {}", summary.very_high_confidence);
    println!("  High confidence:         {}", summary.high_confidence);
    println!("  Medium confidence:       {}", summary.medium_confidence);
    println!("  Low confidence:          {}", summary.low_confidence);
    println!("  Success rate:            {:.1}%", summary.success_rate());

    let updated: Vec<_> = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Updated { .. }))
        .collect();
    if !updated.is_empty() {
        println!("\nSUCCESSFUL UPDATES:");
        for report in updated {
            println!("  {} -> {}", report.filename, report.outcome);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionResult;

    #[test]
    fn test_export_writes_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let reports = vec![ImageReport {
            filename: "shot.png".to_string(),
            outcome: Outcome::NoMatch,
            extraction: ExtractionResult::default(),
            raw_text_preview: "preview".to_string(),
            processed_at: "2025-07-13 16:50:00".to_string(),
        }];
        let summary = RunSummary {
            processed: 1,
            ..Default::default()
        };

        let path = export_json(dir.path(), &reports, &summary).unwrap();
        let raw = fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["summary"]["processed"], 1);
        assert_eq!(parsed["images"][0]["filename"], "shot.png");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("₹₹₹₹", 2), "₹₹");
        assert_eq!(truncate("short", 28), "short");
    }
}
