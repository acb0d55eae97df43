//! Loading canonical transaction records for the command-line runner.

pub mod csv;

pub use self::csv::{load_transactions, parse_transactions_csv};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error reading {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv parse error: {0}")]
    Csv(String),
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}
