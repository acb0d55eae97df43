use crate::domain::{Decimal, Transaction};
use crate::engine::{CalculationOutcome, GainLossEvent};
use serde::Serialize;

/// Decimal places for CAD amounts on the form.
pub const CENTS_DP: u32 = 2;
/// Decimal places for asset units (satoshi precision).
pub const UNITS_DP: u32 = 8;

/// One line of a Schedule 3 style capital gains report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule3Row {
    pub date_of_disposition: String,
    pub description: String,
    pub units: Decimal,
    pub proceeds_of_disposition: Decimal,
    pub adjusted_cost_base: Decimal,
    pub gain_or_loss: Decimal,
    pub superficial_loss: String,
    pub notes: String,
}

impl Schedule3Row {
    pub fn from_event(event: &GainLossEvent, asset: &str, memo: Option<&str>) -> Self {
        let notes = match &event.superficial_match {
            Some(m) if event.superficial_loss_flag => m.describe(),
            _ => memo.unwrap_or_default().to_string(),
        };

        Schedule3Row {
            date_of_disposition: event.date.to_string(),
            description: format!("{} disposition", asset),
            units: event.quantity_disposed.round_half_up(UNITS_DP),
            proceeds_of_disposition: event.proceeds.round_half_up(CENTS_DP),
            adjusted_cost_base: event.cost_base_consumed.round_half_up(CENTS_DP),
            gain_or_loss: event.realized_gain_loss.round_half_up(CENTS_DP),
            superficial_loss: if event.superficial_loss_flag {
                "YES - REVIEW".to_string()
            } else {
                "No".to_string()
            },
            notes,
        }
    }
}

/// Rows for every disposal in `tax_year` (all disposals when None), in event order.
///
/// Each figure is rounded on its own, so a row's gain may differ from the rounded proceeds minus
/// the rounded ACB by a cent.
pub fn schedule3_rows(
    outcome: &CalculationOutcome,
    transactions: &[Transaction],
    asset: &str,
    tax_year: Option<i32>,
) -> Vec<Schedule3Row> {
    outcome
        .events
        .iter()
        .filter(|e| tax_year.map_or(true, |year| e.date.year() == year))
        .map(|e| {
            let memo = transactions
                .get(e.transaction_index)
                .and_then(|tx| tx.memo.as_deref());
            Schedule3Row::from_event(e, asset, memo)
        })
        .collect()
}
