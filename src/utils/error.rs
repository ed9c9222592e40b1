use thiserror::Error;

/// Crate-wide error type. Per-image failures are caught by the orchestrator
/// and recorded as outcomes; only ledger-level failures abort a run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Report error: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Why a candidate transaction identifier was rejected. A rejection is an
/// expected verdict during extraction, not a fault, so it lives apart from
/// `ReconcileError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdRejection {
    #[error("Too short: {0} digits")]
    TooShort(usize),

    #[error("Too long: {0} digits")]
    TooLong(usize),

    #[error("All same digit: {0}")]
    DegenerateDigits(String),

    #[error("Too many zeros: {0}")]
    ExcessZeros(String),
}
