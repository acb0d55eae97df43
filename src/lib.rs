pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod report;

pub use config::Config;
pub use domain::{Decimal, Transaction, TxDate, TxKind};
pub use engine::{
    calculate, CalculationOutcome, GainLossEvent, HoldingState, LotTracker, Snapshot,
    SuperficialLossDetector, SuperficialMatch, TaxSummary,
};
pub use error::{AcbError, AppError};
pub use report::{RunReport, Schedule3Row};
