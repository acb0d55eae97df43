//! Transaction type representing a single acquisition or disposal.

use crate::domain::{Decimal, TxDate, TxKind};
use serde::{Deserialize, Serialize};

/// One normalized acquisition or disposal of the tracked asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Stable identifier used in errors and gain/loss events.
    pub tx_ref: String,
    /// Calendar date of the transaction.
    pub date: TxDate,
    /// Acquire or Dispose.
    pub kind: TxKind,
    /// Units of the asset moved; must be positive.
    pub quantity: Decimal,
    /// Total CAD paid (Acquire) or received (Dispose), fees included.
    pub amount_cad: Decimal,
    /// Free text carried through to reports (never inspected by the engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Transaction {
    /// Create a new Transaction.
    ///
    /// `seq` is the record's position in its source so that identical rows still get distinct refs.
    pub fn new(
        date: TxDate,
        kind: TxKind,
        quantity: Decimal,
        amount_cad: Decimal,
        reference: Option<&str>,
        seq: usize,
    ) -> Self {
        let tx_ref = Self::compute_tx_ref(date, kind, &quantity, &amount_cad, reference, seq);
        Transaction {
            tx_ref,
            date,
            kind,
            quantity,
            amount_cad,
            memo: None,
        }
    }

    pub fn acquire(date: TxDate, quantity: Decimal, cost_cad: Decimal, seq: usize) -> Self {
        Self::new(date, TxKind::Acquire, quantity, cost_cad, None, seq)
    }

    pub fn dispose(date: TxDate, quantity: Decimal, proceeds_cad: Decimal, seq: usize) -> Self {
        Self::new(date, TxKind::Dispose, quantity, proceeds_cad, None, seq)
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Generate a stable key for this transaction.
    ///
    /// Priority: caller-supplied `reference` (if non-empty) > hash of deterministic fields.
    pub fn compute_tx_ref(
        date: TxDate,
        kind: TxKind,
        quantity: &Decimal,
        amount_cad: &Decimal,
        reference: Option<&str>,
        seq: usize,
    ) -> String {
        if let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) {
            return format!("ref:{}", reference);
        }

        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(date.to_string());
        hasher.update(if kind.is_acquire() { b"A" } else { b"D" });
        hasher.update(quantity.to_canonical_string());
        hasher.update(b"|");
        hasher.update(amount_cad.to_canonical_string());
        hasher.update((seq as u64).to_le_bytes());
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }

    /// Borrow the precomputed transaction ref.
    pub fn tx_ref(&self) -> &str {
        &self.tx_ref
    }
}
