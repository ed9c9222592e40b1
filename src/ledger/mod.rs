use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::models::LedgerRecord;
use crate::utils::ReconcileError;

/// The external ledger, seen as a row-oriented record source/sink. Row
/// references handed out by `pending_records` stay stable for the length
/// of one batch run.
pub trait LedgerStore {
    /// All records, in ledger order, numbered with stable row references.
    fn pending_records(&self) -> Result<Vec<LedgerRecord>, ReconcileError>;

    /// Write a transaction id into one row. Returns false when the sink
    /// refuses the write (e.g. the row vanished underneath us).
    fn set_transaction_id(&mut self, row: usize, transaction_id: &str)
        -> Result<bool, ReconcileError>;
}

/// JSON-file ledger: an array of record objects, rewritten in place on
/// every committed update. Rows are numbered 2-based so they line up with
/// spreadsheet row numbers (row 1 is the header).
pub struct JsonLedger {
    path: PathBuf,
    records: Vec<LedgerRecord>,
}

const ROW_OFFSET: usize = 2;

impl JsonLedger {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReconcileError> {
        let raw = fs::read_to_string(path.as_ref())
            .map_err(|e| ReconcileError::Ledger(format!("Failed to read ledger file: {}", e)))?;
        let mut records: Vec<LedgerRecord> = serde_json::from_str(&raw)?;
        for (idx, record) in records.iter_mut().enumerate() {
            record.row = idx + ROW_OFFSET;
        }
        info!("Loaded {} ledger records from {}", records.len(), path.as_ref().display());
        Ok(JsonLedger {
            path: path.as_ref().to_path_buf(),
            records,
        })
    }

    fn persist(&self) -> Result<(), ReconcileError> {
        let serialized = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, serialized)
            .map_err(|e| ReconcileError::Ledger(format!("Failed to write ledger file: {}", e)))?;
        Ok(())
    }
}

impl LedgerStore for JsonLedger {
    fn pending_records(&self) -> Result<Vec<LedgerRecord>, ReconcileError> {
        Ok(self.records.clone())
    }

    fn set_transaction_id(
        &mut self,
        row: usize,
        transaction_id: &str,
    ) -> Result<bool, ReconcileError> {
        let record = match self
            .records
            .iter_mut()
            .find(|r| r.row == row)
        {
            Some(record) => record,
            None => {
                error!("No ledger row {} to update", row);
                return Ok(false);
            }
        };
        record.transaction_id = transaction_id.to_string();
        self.persist()?;
        info!("Updated ledger row {} with transaction ID {}", row, transaction_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_file(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn test_rows_are_numbered_from_two() {
        let file = ledger_file(
            r#"[{"payer_vpa": "a@b", "amount": "500", "date": "13/07/2025"},
                {"payer_vpa": "c@d", "amount": "750", "date": "14/07/2025"}]"#,
        );
        let ledger = JsonLedger::open(file.path()).unwrap();
        let records = ledger.pending_records().unwrap();
        assert_eq!(records[0].row, 2);
        assert_eq!(records[1].row, 3);
        assert!(!records[0].is_settled());
    }

    #[test]
    fn test_update_persists_to_disk() {
        let file = ledger_file(r#"[{"payer_vpa": "a@b", "amount": "500", "date": ""}]"#);
        let mut ledger = JsonLedger::open(file.path()).unwrap();
        assert!(ledger.set_transaction_id(2, "400123456789").unwrap());

        let reloaded = JsonLedger::open(file.path()).unwrap();
        let records = reloaded.pending_records().unwrap();
        assert_eq!(records[0].transaction_id, "400123456789");
        assert!(records[0].is_settled());
    }

    #[test]
    fn test_unknown_row_is_rejected_not_fatal() {
        let file = ledger_file(r#"[{"payer_vpa": "a@b", "amount": "500", "date": ""}]"#);
        let mut ledger = JsonLedger::open(file.path()).unwrap();
        assert!(!ledger.set_transaction_id(99, "400123456789").unwrap());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(JsonLedger::open("/nonexistent/ledger.json").is_err());
    }
}
