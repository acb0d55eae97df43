//! Domain primitives: TxDate, TxKind.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Calendar date of a transaction. CRA windows count calendar days, so no time component is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxDate(pub NaiveDate);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date {0:?}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
pub struct DateParseError(pub String);

impl TxDate {
    /// Create a TxDate from year/month/day; None if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(TxDate)
    }

    /// Get the underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Signed number of calendar days from `self` to `other` (positive when `other` is later).
    pub fn days_until(&self, other: TxDate) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl FromStr for TxDate {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(TxDate(date));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map(|dt| TxDate(dt.date()))
            .map_err(|_| DateParseError(s.to_string()))
    }
}

impl std::fmt::Display for TxDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Transaction kind, already resolved by whoever produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Units enter the pool at the given total cost.
    Acquire,
    /// Units leave the pool for the given total proceeds.
    Dispose,
}

impl TxKind {
    pub fn is_acquire(&self) -> bool {
        matches!(self, TxKind::Acquire)
    }
}

impl std::fmt::Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::Acquire => write!(f, "acquire"),
            TxKind::Dispose => write!(f, "dispose"),
        }
    }
}
