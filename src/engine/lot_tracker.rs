use crate::domain::{Decimal, Transaction, TxKind};
use crate::error::AcbError;
use serde::{Deserialize, Serialize};

use super::{GainLossEvent, Snapshot};

/// Decimal places kept on the cost base carried out by a partial disposal.
///
/// Far below a cent, and short enough that every later add or subtract on the pool stays exact,
/// so `total_cost_base == acquired - consumed` holds digit for digit.
pub const COST_BASE_DP: u32 = 16;

/// Why the pool refused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The disposal asks for more units than are held.
    Insufficient,
    /// A running total left the decimal range.
    Overflow,
}

/// Pooled holding of the asset under the weighted-average method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoldingState {
    /// Units currently held; never negative.
    pub total_quantity_held: Decimal,

    /// Cost attributable to all currently held units.
    pub total_cost_base: Decimal,
}

impl HoldingState {
    pub fn new() -> Self {
        Self {
            total_quantity_held: Decimal::zero(),
            total_cost_base: Decimal::zero(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_quantity_held.is_zero()
    }

    /// ACB per unit, valid for the entire holding. Undefined while nothing is held.
    pub fn average_cost_per_unit(&self) -> Option<Decimal> {
        if self.is_empty() {
            return None;
        }
        self.total_cost_base.checked_div(self.total_quantity_held)
    }

    /// State after adding `quantity` units bought for `cost` in total.
    ///
    /// Fails when either total, or the resulting average, leaves the decimal range.
    pub fn acquire(&self, quantity: Decimal, cost: Decimal) -> Result<HoldingState, PoolError> {
        let next = HoldingState {
            total_quantity_held: self
                .total_quantity_held
                .checked_add(quantity)
                .ok_or(PoolError::Overflow)?,
            total_cost_base: self
                .total_cost_base
                .checked_add(cost)
                .ok_or(PoolError::Overflow)?,
        };
        if !next.is_empty() && next.average_cost_per_unit().is_none() {
            return Err(PoolError::Overflow);
        }
        Ok(next)
    }

    /// State after removing `quantity` units, plus the cost base they carried out.
    ///
    /// Disposing of the whole holding takes the whole cost base, so the pool lands on exactly
    /// zero. A partial disposal takes `average * quantity` at [`COST_BASE_DP`] places.
    pub fn dispose(&self, quantity: Decimal) -> Result<(HoldingState, Decimal), PoolError> {
        if quantity > self.total_quantity_held {
            return Err(PoolError::Insufficient);
        }
        if quantity == self.total_quantity_held {
            return Ok((HoldingState::new(), self.total_cost_base));
        }

        let average = self.average_cost_per_unit().ok_or(PoolError::Overflow)?;
        let consumed = average
            .checked_mul(quantity)
            .ok_or(PoolError::Overflow)?
            .round_half_up(COST_BASE_DP);
        // Rounding must never push the pool negative.
        let consumed = if consumed > self.total_cost_base {
            self.total_cost_base
        } else {
            consumed
        };

        Ok((
            HoldingState {
                total_quantity_held: self.total_quantity_held - quantity,
                total_cost_base: self.total_cost_base - consumed,
            },
            consumed,
        ))
    }
}

/// Reject records that would corrupt the running average.
pub fn validate_transaction(index: usize, tx: &Transaction) -> Result<(), AcbError> {
    let invalid = |reason: String| AcbError::InvalidTransaction {
        index,
        tx_ref: tx.tx_ref.clone(),
        reason,
    };

    if !tx.quantity.is_positive() {
        return Err(invalid(format!(
            "quantity must be positive, got {}",
            tx.quantity
        )));
    }
    if tx.amount_cad.is_negative() {
        let field = match tx.kind {
            TxKind::Acquire => "cost",
            TxKind::Dispose => "proceeds",
        };
        return Err(invalid(format!(
            "{} must not be negative, got {}",
            field, tx.amount_cad
        )));
    }
    Ok(())
}

/// Sequential replay of transactions into a single weighted-average pool.
///
/// The tracker is the accumulator of a fold: each `apply` consumes it and returns the next one.
#[derive(Debug, Clone, Default)]
pub struct LotTracker {
    state: HoldingState,

    // Running totals of all costs paid and proceeds received. They bound every sum a summary
    // takes over the events, so overflow is caught here.
    total_acquired: Decimal,
    total_proceeds: Decimal,

    // Outputs accumulated during processing.
    events: Vec<GainLossEvent>,
    snapshots: Vec<Snapshot>,
}

impl LotTracker {
    pub fn new() -> Self {
        Self {
            state: HoldingState::new(),
            total_acquired: Decimal::zero(),
            total_proceeds: Decimal::zero(),
            events: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn state(&self) -> &HoldingState {
        &self.state
    }

    pub fn events(&self) -> &[GainLossEvent] {
        &self.events
    }

    /// Sum of every acquisition cost applied so far.
    pub fn total_acquired(&self) -> Decimal {
        self.total_acquired
    }

    /// Sum of every disposal's proceeds applied so far.
    pub fn total_proceeds(&self) -> Decimal {
        self.total_proceeds
    }

    /// Validate every transaction, then fold them in order.
    pub fn run(transactions: &[Transaction]) -> Result<Self, AcbError> {
        transactions
            .iter()
            .enumerate()
            .try_for_each(|(index, tx)| validate_transaction(index, tx))?;

        transactions
            .iter()
            .enumerate()
            .try_fold(Self::new(), |tracker, (index, tx)| tracker.apply(index, tx))
    }

    /// Apply one transaction at position `index` of the input.
    pub fn apply(mut self, index: usize, tx: &Transaction) -> Result<Self, AcbError> {
        validate_transaction(index, tx)?;

        let overflow = || AcbError::InvalidTransaction {
            index,
            tx_ref: tx.tx_ref.clone(),
            reason: "amount overflow: running totals exceed the decimal range".to_string(),
        };

        match tx.kind {
            TxKind::Acquire => {
                self.total_acquired = self
                    .total_acquired
                    .checked_add(tx.amount_cad)
                    .ok_or_else(overflow)?;
                self.state = self
                    .state
                    .acquire(tx.quantity, tx.amount_cad)
                    .map_err(|_| overflow())?;
            }
            TxKind::Dispose => {
                let (next, consumed) = self.state.dispose(tx.quantity).map_err(|e| match e {
                    PoolError::Insufficient => AcbError::InsufficientHoldings {
                        index,
                        tx_ref: tx.tx_ref.clone(),
                        date: tx.date,
                        requested: tx.quantity,
                        held: self.state.total_quantity_held,
                    },
                    PoolError::Overflow => overflow(),
                })?;
                self.total_proceeds = self
                    .total_proceeds
                    .checked_add(tx.amount_cad)
                    .ok_or_else(overflow)?;

                self.events.push(GainLossEvent {
                    transaction_index: index,
                    transaction_ref: tx.tx_ref.clone(),
                    date: tx.date,
                    quantity_disposed: tx.quantity,
                    proceeds: tx.amount_cad,
                    cost_base_consumed: consumed,
                    realized_gain_loss: tx.amount_cad - consumed,
                    superficial_loss_flag: false,
                    superficial_match: None,
                });
                self.state = next;
            }
        }

        tracing::debug!(
            index,
            tx_ref = %tx.tx_ref,
            kind = %tx.kind,
            held = %self.state.total_quantity_held,
            cost_base = %self.state.total_cost_base,
            "Applied transaction"
        );

        self.snapshots.push(Snapshot {
            transaction_index: index,
            transaction_ref: tx.tx_ref.clone(),
            date: tx.date,
            kind: tx.kind,
            quantity_held_after: self.state.total_quantity_held,
            cost_base_after: self.state.total_cost_base,
            average_cost_after: self.state.average_cost_per_unit(),
        });

        Ok(self)
    }

    /// Get the accumulated outputs.
    pub fn into_outputs(self) -> (Vec<GainLossEvent>, Vec<Snapshot>, HoldingState) {
        (self.events, self.snapshots, self.state)
    }
}
