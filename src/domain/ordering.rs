//! Stable transaction ordering for deterministic processing.

use crate::domain::Transaction;

/// Sort transactions by date, keeping input order for equal dates.
///
/// The engine never calls this; it is for producers of the transaction sequence.
pub fn sort_chronological(transactions: &mut [Transaction]) {
    // slice::sort_by_key is stable.
    transactions.sort_by_key(|tx| tx.date);
}

/// Index of the first transaction dated earlier than its predecessor, if any.
pub fn first_out_of_order(transactions: &[Transaction]) -> Option<usize> {
    transactions
        .windows(2)
        .position(|pair| pair[1].date < pair[0].date)
        .map(|i| i + 1)
}
