//! Pure computation engine for the weighted-average ACB ledger.

use crate::domain::{first_out_of_order, Decimal, Transaction, TxDate, TxKind};
use crate::error::AcbError;
use serde::{Deserialize, Serialize};

pub mod lot_tracker;
pub mod summary;
pub mod superficial;

pub use lot_tracker::{validate_transaction, HoldingState, LotTracker, PoolError, COST_BASE_DP};
pub use summary::{TaxSummary, DEFAULT_INCLUSION_RATE};
pub use superficial::{SuperficialLossDetector, SUPERFICIAL_WINDOW_DAYS};

/// One realized disposal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainLossEvent {
    pub transaction_index: usize,
    pub transaction_ref: String,
    pub date: TxDate,
    pub quantity_disposed: Decimal,
    pub proceeds: Decimal,
    pub cost_base_consumed: Decimal,
    /// proceeds - cost_base_consumed
    pub realized_gain_loss: Decimal,
    pub superficial_loss_flag: bool,
    /// First acquisition inside the window, when flagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superficial_match: Option<SuperficialMatch>,
}

impl GainLossEvent {
    pub fn is_loss(&self) -> bool {
        self.realized_gain_loss.is_negative()
    }
}

/// The acquisition that put a loss inside the superficial-loss window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperficialMatch {
    pub acquisition_ref: String,
    pub acquisition_date: TxDate,
    /// Negative when the acquisition precedes the disposal.
    pub days_from_disposal: i64,
}

impl SuperficialMatch {
    pub fn describe(&self) -> String {
        let when = match self.days_from_disposal {
            0 => "on the disposal date".to_string(),
            d if d < 0 => format!("{} days before the disposal", -d),
            d => format!("{} days after the disposal", d),
        };
        format!(
            "Potential superficial loss: acquisition {} on {} ({}); review holdings 30 days after the sale",
            self.acquisition_ref, self.acquisition_date, when
        )
    }
}

/// Holding state right after a transaction was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transaction_index: usize,
    pub transaction_ref: String,
    pub date: TxDate,
    pub kind: TxKind,
    pub quantity_held_after: Decimal,
    pub cost_base_after: Decimal,
    /// None when nothing is held.
    pub average_cost_after: Option<Decimal>,
}

/// Everything a single run produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationOutcome {
    pub events: Vec<GainLossEvent>,
    pub snapshots: Vec<Snapshot>,
    pub final_state: HoldingState,
}

/// Run the full pipeline: Lot Tracker pass, then superficial-loss annotation.
///
/// Transactions are processed in the order given. Any invariant violation aborts the run and
/// no partial output is returned.
pub fn calculate(transactions: &[Transaction]) -> Result<CalculationOutcome, AcbError> {
    calculate_with(transactions, &SuperficialLossDetector::default())
}

pub fn calculate_with(
    transactions: &[Transaction],
    detector: &SuperficialLossDetector,
) -> Result<CalculationOutcome, AcbError> {
    if let Some(index) = first_out_of_order(transactions) {
        tracing::warn!(
            index,
            tx_ref = %transactions[index].tx_ref,
            "Transactions are not in chronological order; processing in the order given"
        );
    }

    let (mut events, snapshots, final_state) = LotTracker::run(transactions)?.into_outputs();
    let flagged = detector.annotate(transactions, &mut events);

    tracing::info!(
        transactions = transactions.len(),
        disposals = events.len(),
        superficial_flags = flagged,
        held = %final_state.total_quantity_held,
        "ACB calculation complete"
    );

    Ok(CalculationOutcome {
        events,
        snapshots,
        final_state,
    })
}
