//! Report projections over calculation outcomes. This is the only place amounts are rounded.

use crate::domain::{Decimal, Transaction};
use crate::engine::{CalculationOutcome, GainLossEvent, Snapshot, TaxSummary};
use serde::Serialize;

pub mod schedule3;

pub use schedule3::{schedule3_rows, Schedule3Row, CENTS_DP, UNITS_DP};

/// The document the command-line runner prints.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub asset: String,
    pub summary: TaxSummary,
    pub events: Vec<GainLossEvent>,
    pub snapshots: Vec<Snapshot>,
    pub schedule3: Vec<Schedule3Row>,
}

impl RunReport {
    pub fn build(
        outcome: CalculationOutcome,
        transactions: &[Transaction],
        asset: &str,
        tax_year: Option<i32>,
        inclusion_rate: Decimal,
    ) -> Self {
        let summary = TaxSummary::from_outcome(&outcome, tax_year, inclusion_rate);
        let schedule3 = schedule3_rows(&outcome, transactions, asset, tax_year);
        RunReport {
            asset: asset.to_string(),
            summary,
            events: outcome.events,
            snapshots: outcome.snapshots,
            schedule3,
        }
    }
}
