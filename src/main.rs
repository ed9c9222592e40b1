// Reconcile UPI payment screenshots against a pending-payments ledger.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use khata::ledger::JsonLedger;
use khata::report;
use khata::Reconciler;

#[derive(Parser)]
#[command(name = "khata", about = "UPI payment-screenshot reconciliation")]
struct Cli {
    /// Directory containing payment screenshots
    images_dir: PathBuf,

    /// Ledger file (JSON array of pending payment records)
    #[arg(long)]
    ledger: PathBuf,

    /// Directory for the JSON run report (defaults to the images directory)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Pause after each committed update, in milliseconds
    #[arg(long, default_value_t = 500)]
    commit_delay_ms: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if !cli.images_dir.is_dir() {
        error!("Image folder does not exist: {}", cli.images_dir.display());
        return ExitCode::FAILURE;
    }

    let mut ledger = match JsonLedger::open(&cli.ledger) {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("Failed to open ledger: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting reconciliation over {}", cli.images_dir.display());
    let reconciler = Reconciler::with_commit_delay(Duration::from_millis(cli.commit_delay_ms));

    let (reports, summary) = match reconciler.process_batch(&cli.images_dir, &mut ledger) {
        Ok(output) => output,
        Err(e) => {
            error!("Reconciliation run failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    report::print_report(&reports, &summary);

    let report_dir = cli.report_dir.unwrap_or(cli.images_dir);
    match report::export_json(&report_dir, &reports, &summary) {
        Ok(path) => println!("\nRun report saved to: {}", path.display()),
        Err(e) => error!("Failed to export run report: {}", e),
    }

    ExitCode::SUCCESS
}
