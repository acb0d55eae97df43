//! Domain types and determinism layer for the ACB ledger.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TxDate, TxKind
//! - Transaction type with a stable reference key
//! - Stable chronological ordering helper

pub mod decimal;
pub mod ordering;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use ordering::{first_out_of_order, sort_chronological};
pub use primitives::{DateParseError, TxDate, TxKind};
pub use transaction::Transaction;
