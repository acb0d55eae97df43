use super::CalculationOutcome;
use crate::domain::Decimal;
use rust_decimal::Decimal as RustDecimal;
use serde::Serialize;

/// Capital gains inclusion rate applied when none is configured.
pub const DEFAULT_INCLUSION_RATE: Decimal = Decimal::new(RustDecimal::from_parts(5, 0, 0, false, 1));

/// Totals over the disposals of one tax year (or the whole run).
///
/// Flagged losses are held out of `total_losses` until reviewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxSummary {
    pub tax_year: Option<i32>,
    pub disposal_count: usize,
    pub total_gains: Decimal,
    pub total_losses: Decimal,
    pub superficial_losses: Decimal,
    pub superficial_loss_count: usize,
    pub net_capital_gain: Decimal,
    pub inclusion_rate: Decimal,
    pub taxable_capital_gain: Decimal,
    pub holdings_quantity: Decimal,
    pub holdings_cost_base: Decimal,
    pub holdings_average_cost: Option<Decimal>,
}

impl TaxSummary {
    pub fn from_outcome(
        outcome: &CalculationOutcome,
        tax_year: Option<i32>,
        inclusion_rate: Decimal,
    ) -> Self {
        let mut total_gains = Decimal::zero();
        let mut total_losses = Decimal::zero();
        let mut superficial_losses = Decimal::zero();
        let mut superficial_loss_count = 0;
        let mut disposal_count = 0;

        let in_year = outcome
            .events
            .iter()
            .filter(|e| tax_year.map_or(true, |year| e.date.year() == year));

        for event in in_year {
            disposal_count += 1;
            if !event.is_loss() {
                total_gains += event.realized_gain_loss;
            } else if event.superficial_loss_flag {
                superficial_loss_count += 1;
                superficial_losses += event.realized_gain_loss.abs();
            } else {
                total_losses += event.realized_gain_loss.abs();
            }
        }

        let net_capital_gain = total_gains - total_losses;
        let taxable_capital_gain = (net_capital_gain * inclusion_rate).max(Decimal::zero());

        TaxSummary {
            tax_year,
            disposal_count,
            total_gains,
            total_losses,
            superficial_losses,
            superficial_loss_count,
            net_capital_gain,
            inclusion_rate,
            taxable_capital_gain,
            holdings_quantity: outcome.final_state.total_quantity_held,
            holdings_cost_base: outcome.final_state.total_cost_base,
            holdings_average_cost: outcome.final_state.average_cost_per_unit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Transaction, TxDate};
    use crate::engine::calculate;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn day(s: &str) -> TxDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_inclusion_rate_is_half() {
        assert_eq!(DEFAULT_INCLUSION_RATE, d("0.5"));
    }

    #[test]
    fn test_summary_splits_gains_losses_and_superficial() {
        let txs = vec![
            Transaction::acquire(day("2024-01-01"), d("3"), d("30000"), 0),
            // +2000
            Transaction::dispose(day("2024-03-01"), d("1"), d("12000"), 1),
            // -1000, no acquisition within 30 days
            Transaction::dispose(day("2024-06-01"), d("1"), d("9000"), 2),
            // -4000, flagged by the repurchase below
            Transaction::dispose(day("2024-09-01"), d("1"), d("6000"), 3),
            Transaction::acquire(day("2024-09-15"), d("0.1"), d("600"), 4),
        ];
        let outcome = calculate(&txs).unwrap();
        let summary = TaxSummary::from_outcome(&outcome, Some(2024), DEFAULT_INCLUSION_RATE);

        assert_eq!(summary.disposal_count, 3);
        assert_eq!(summary.total_gains, d("2000"));
        assert_eq!(summary.total_losses, d("1000"));
        assert_eq!(summary.superficial_losses, d("4000"));
        assert_eq!(summary.superficial_loss_count, 1);
        assert_eq!(summary.net_capital_gain, d("1000"));
        assert_eq!(summary.taxable_capital_gain, d("500"));
        assert_eq!(summary.holdings_quantity, d("0.1"));
        assert_eq!(summary.holdings_cost_base, d("600"));
        assert_eq!(summary.holdings_average_cost, Some(d("6000")));
    }

    #[test]
    fn test_summary_year_filter_and_floor_at_zero() {
        let txs = vec![
            Transaction::acquire(day("2023-01-01"), d("2"), d("20000"), 0),
            Transaction::dispose(day("2023-06-01"), d("1"), d("15000"), 1),
            Transaction::dispose(day("2024-06-01"), d("1"), d("4000"), 2),
        ];
        let outcome = calculate(&txs).unwrap();

        let y2024 = TaxSummary::from_outcome(&outcome, Some(2024), DEFAULT_INCLUSION_RATE);
        assert_eq!(y2024.disposal_count, 1);
        assert_eq!(y2024.net_capital_gain, d("-6000"));
        assert_eq!(y2024.taxable_capital_gain, Decimal::zero());
        assert_eq!(y2024.holdings_average_cost, None);

        let all = TaxSummary::from_outcome(&outcome, None, d("1"));
        assert_eq!(all.disposal_count, 2);
        assert_eq!(all.net_capital_gain, d("-1000"));
        assert_eq!(all.taxable_capital_gain, Decimal::zero());
    }
}
