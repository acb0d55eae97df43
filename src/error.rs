use crate::config::ConfigError;
use crate::domain::{Decimal, TxDate};
use crate::ingest::IngestError;
use thiserror::Error;

/// Invariant violations that abort an ACB run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcbError {
    #[error(
        "Insufficient holdings: transaction {tx_ref} (#{index}, {date}) disposes {requested} but only {held} is held"
    )]
    InsufficientHoldings {
        index: usize,
        tx_ref: String,
        date: TxDate,
        requested: Decimal,
        held: Decimal,
    },
    #[error("Invalid transaction {tx_ref} (#{index}): {reason}")]
    InvalidTransaction {
        index: usize,
        tx_ref: String,
        reason: String,
    },
}

impl AcbError {
    /// Reference of the transaction that aborted the run.
    pub fn tx_ref(&self) -> &str {
        match self {
            AcbError::InsufficientHoldings { tx_ref, .. } => tx_ref,
            AcbError::InvalidTransaction { tx_ref, .. } => tx_ref,
        }
    }

    /// Position of that transaction in the input sequence.
    pub fn index(&self) -> usize {
        match self {
            AcbError::InsufficientHoldings { index, .. } => *index,
            AcbError::InvalidTransaction { index, .. } => *index,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Input error: {0}")]
    Ingest(#[from] IngestError),
    #[error("Calculation aborted: {0}")]
    Engine(#[from] AcbError),
    #[error("Output error: {0}")]
    Output(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Output(err.to_string())
    }
}
