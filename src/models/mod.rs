pub mod data;
pub mod record;

pub use data::{
    ConfidenceTier, ExtractionResult, IdCandidate, ImageReport, MatchResult, OcrQuality, Outcome,
    RunSummary,
};
pub use record::LedgerRecord;
