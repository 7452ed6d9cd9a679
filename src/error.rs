use thiserror::Error;

use crate::core::Month;

/// Failures raised by the collaborators around the ledger engine. The engine
/// itself never fails.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
    #[error("expected {expected} monthly rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {position} must be {expected}, found {found}")]
    MonthOrder {
        position: usize,
        expected: Month,
        found: Month,
    },
    #[error("unknown month label: {0:?}")]
    UnknownMonth(String),
}
