use serde::Serialize;
use std::fmt;

/// Ordinal trust label for one extracted field value.
/// VeryHigh > High > Medium > Low > VeryLow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ConfidenceTier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => "Very High",
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
            ConfidenceTier::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Readability assessment of a block of OCR text, independent of any
/// field-level confidence. Advisory only; extraction runs regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OcrQuality {
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl fmt::Display for OcrQuality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            OcrQuality::Good => "Good",
            OcrQuality::Fair => "Fair",
            OcrQuality::Poor => "Poor",
            OcrQuality::VeryPoor => "Very Poor",
        };
        write!(f, "{}", label)
    }
}

/// One validated transaction-id candidate produced by a pattern rule.
/// The full ranked list is kept on the result for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct IdCandidate {
    pub id: String,
    pub confidence: ConfidenceTier,
    pub score: i32,
    pub position: usize,
    pub context: String,
}

/// Per-image aggregate of every resolved field. Built once by the
/// extractor, immutable afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionResult {
    pub transaction_id: String,
    pub transaction_id_confidence: Option<ConfidenceTier>,
    pub validation_score: i32,
    pub candidates: Vec<IdCandidate>,
    pub date: String,
    pub time: String,
    pub transaction_mode: String,
    pub amount: String,
    pub amount_confidence: Option<ConfidenceTier>,
    pub payer_vpa: String,
    pub vpa_confidence: Option<ConfidenceTier>,
    pub validation_errors: Vec<String>,
    pub ocr_quality: Option<OcrQuality>,
}

/// A resolved correspondence between one extraction and one ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub row: usize,
    pub score: f64,
}

/// Final disposition of one image. Every image in a batch yields exactly
/// one of these; nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    /// Identifier committed into the matched ledger row.
    Updated { row: usize, id: String },
    /// A match was found but the ledger sink rejected the write.
    CommitRejected { row: usize },
    /// A match was found but the extracted identifier failed final validation.
    InvalidIdentifier { reason: String },
    /// No ledger record crossed the match threshold.
    NoMatch,
    /// A record matched but no usable identifier was extracted.
    NoIdentifier,
    /// Unexpected failure while processing this image.
    ProcessingError { message: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Updated { row, id } => write!(f, "UPDATED row {} with {}", row, id),
            Outcome::CommitRejected { row } => write!(f, "Ledger rejected update for row {}", row),
            Outcome::InvalidIdentifier { reason } => {
                write!(f, "Final validation failed: {}", reason)
            }
            Outcome::NoMatch => write!(f, "No matching ledger record found"),
            Outcome::NoIdentifier => write!(f, "No valid transaction ID extracted"),
            Outcome::ProcessingError { message } => write!(f, "Processing error: {}", message),
        }
    }
}

/// One row of the final run report.
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub filename: String,
    pub outcome: Outcome,
    pub extraction: ExtractionResult,
    pub raw_text_preview: String,
    pub processed_at: String,
}

/// Aggregate counters for one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub matched: usize,
    pub updated: usize,
    pub errors: usize,
    pub very_high_confidence: usize,
    pub high_confidence: usize,
    pub medium_confidence: usize,
    pub low_confidence: usize,
}

impl RunSummary {
    pub fn success_rate(&self) -> f64 {
        self.updated as f64 / self.processed.max(1) as f64 * 100.0
    }
}
