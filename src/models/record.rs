use serde::{Deserialize, Serialize};

/// One pending payment row from the external ledger. Parsed from the
/// loosely-typed source exactly once, at the boundary; amount and date stay
/// as text because the source is text and the resolver parses tolerantly.
///
/// `row` is a stable 1-based reference valid for the duration of a batch.
/// A record is eligible as a match target only while `transaction_id` is
/// empty, and receives a committed identifier at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub payer_vpa: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
}

impl LedgerRecord {
    pub fn is_settled(&self) -> bool {
        !self.transaction_id.trim().is_empty()
    }
}
