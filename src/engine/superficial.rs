//! Superficial-loss flagging for realized losses.

use super::{GainLossEvent, SuperficialMatch};
use crate::domain::Transaction;

/// Calendar days on each side of a disposal in which a repurchase makes the loss superficial.
pub const SUPERFICIAL_WINDOW_DAYS: i64 = 30;

/// Flags losses that have an acquisition within the window around the disposal date.
///
/// A single acquisition of any size is enough; the flag marks the loss for manual review and
/// no partial disallowance is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperficialLossDetector {
    window_days: i64,
}

impl SuperficialLossDetector {
    pub fn new() -> Self {
        Self::with_window_days(SUPERFICIAL_WINDOW_DAYS)
    }

    pub fn with_window_days(window_days: i64) -> Self {
        Self {
            window_days: window_days.max(0),
        }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Set or clear the flag on every event. Only the flag and match fields are touched.
    ///
    /// Returns the number of flagged events.
    pub fn annotate(&self, transactions: &[Transaction], events: &mut [GainLossEvent]) -> usize {
        let candidates = acquisitions(transactions);

        let mut flagged = 0;
        for event in events.iter_mut() {
            let found = if event.is_loss() {
                self.match_in(&candidates, event)
            } else {
                None
            };

            event.superficial_loss_flag = found.is_some();
            if let Some(m) = &found {
                flagged += 1;
                tracing::warn!(
                    tx_ref = %event.transaction_ref,
                    date = %event.date,
                    loss = %event.realized_gain_loss,
                    acquisition = %m.acquisition_ref,
                    days = m.days_from_disposal,
                    "Potential superficial loss"
                );
            }
            event.superficial_match = found;
        }
        flagged
    }

    /// First acquisition (in input order) inside the window around a loss event.
    pub fn find_repurchase(
        &self,
        transactions: &[Transaction],
        event: &GainLossEvent,
    ) -> Option<SuperficialMatch> {
        if !event.is_loss() {
            return None;
        }
        self.match_in(&acquisitions(transactions), event)
    }

    fn match_in(
        &self,
        acquisitions: &[(usize, &Transaction)],
        event: &GainLossEvent,
    ) -> Option<SuperficialMatch> {
        acquisitions
            .iter()
            .filter(|(index, _)| *index != event.transaction_index)
            .find_map(|(_, tx)| {
                let offset = event.date.days_until(tx.date);
                (offset.abs() <= self.window_days).then(|| SuperficialMatch {
                    acquisition_ref: tx.tx_ref.clone(),
                    acquisition_date: tx.date,
                    days_from_disposal: offset,
                })
            })
    }
}

/// Acquire transactions with their input positions, in input order.
fn acquisitions(transactions: &[Transaction]) -> Vec<(usize, &Transaction)> {
    transactions
        .iter()
        .enumerate()
        .filter(|(_, tx)| tx.kind.is_acquire())
        .collect()
}

impl Default for SuperficialLossDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, TxDate};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn day(s: &str) -> TxDate {
        s.parse().unwrap()
    }

    fn loss_event(index: usize, date: &str) -> GainLossEvent {
        GainLossEvent {
            transaction_index: index,
            transaction_ref: format!("ref:{}", index),
            date: day(date),
            quantity_disposed: d("1"),
            proceeds: d("12000"),
            cost_base_consumed: d("15000"),
            realized_gain_loss: d("-3000"),
            superficial_loss_flag: false,
            superficial_match: None,
        }
    }

    fn acquire(date: &str, seq: usize) -> Transaction {
        Transaction::acquire(day(date), d("0.01"), d("150"), seq)
    }

    fn dispose(date: &str, seq: usize) -> Transaction {
        Transaction::dispose(day(date), d("1"), d("12000"), seq)
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let detector = SuperficialLossDetector::new();
        let event = loss_event(1, "2024-03-01");

        let after_30 = vec![dispose("2024-03-01", 0), acquire("2024-03-31", 1)];
        let event_after = GainLossEvent {
            transaction_index: 0,
            ..event.clone()
        };
        assert!(detector.find_repurchase(&after_30, &event_after).is_some());

        let after_31 = vec![dispose("2024-03-01", 0), acquire("2024-04-01", 1)];
        assert!(detector.find_repurchase(&after_31, &event_after).is_none());

        let before_30 = vec![acquire("2024-01-31", 0), dispose("2024-03-01", 1)];
        let m = detector.find_repurchase(&before_30, &event).unwrap();
        assert_eq!(m.days_from_disposal, -30);

        let before_31 = vec![acquire("2024-01-30", 0), dispose("2024-03-01", 1)];
        assert!(detector.find_repurchase(&before_31, &event).is_none());
    }

    #[test]
    fn test_gains_are_never_flagged() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![acquire("2024-03-01", 0), dispose("2024-03-02", 1)];
        let mut events = vec![GainLossEvent {
            realized_gain_loss: d("0"),
            ..loss_event(1, "2024-03-02")
        }];

        assert_eq!(detector.annotate(&txs, &mut events), 0);
        assert!(!events[0].superficial_loss_flag);
        assert!(events[0].superficial_match.is_none());
    }

    #[test]
    fn test_no_acquisitions_means_no_flags() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![dispose("2024-03-01", 0)];
        let mut events = vec![loss_event(0, "2024-03-01")];

        assert_eq!(detector.annotate(&txs, &mut events), 0);
        assert!(!events[0].superficial_loss_flag);
    }

    #[test]
    fn test_annotate_only_touches_flag_fields() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![acquire("2024-02-20", 0), dispose("2024-03-01", 1)];
        let original = loss_event(1, "2024-03-01");
        let mut events = vec![original.clone()];

        assert_eq!(detector.annotate(&txs, &mut events), 1);
        let flagged = &events[0];
        assert!(flagged.superficial_loss_flag);
        assert_eq!(flagged.proceeds, original.proceeds);
        assert_eq!(flagged.cost_base_consumed, original.cost_base_consumed);
        assert_eq!(flagged.realized_gain_loss, original.realized_gain_loss);
        assert_eq!(flagged.quantity_disposed, original.quantity_disposed);
    }

    #[test]
    fn test_reannotation_clears_stale_flag() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![dispose("2024-03-01", 0)];
        let mut stale = loss_event(0, "2024-03-01");
        stale.superficial_loss_flag = true;
        let mut events = vec![stale];

        detector.annotate(&txs, &mut events);
        assert!(!events[0].superficial_loss_flag);
    }

    #[test]
    fn test_first_matching_acquisition_is_reported() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![
            acquire("2024-01-01", 0),
            acquire("2024-02-25", 1),
            dispose("2024-03-01", 2),
            acquire("2024-03-05", 3),
        ];
        let m = detector
            .find_repurchase(&txs, &loss_event(2, "2024-03-01"))
            .unwrap();
        assert_eq!(m.acquisition_ref, txs[1].tx_ref);
        assert_eq!(m.days_from_disposal, -5);
    }

    #[test]
    fn test_lookup_agrees_with_annotation() {
        let detector = SuperficialLossDetector::new();
        let txs = vec![
            acquire("2024-01-01", 0),
            dispose("2024-03-01", 1),
            acquire("2024-03-20", 2),
        ];
        let mut events = vec![loss_event(1, "2024-03-01")];
        let found = detector.find_repurchase(&txs, &events[0]);

        detector.annotate(&txs, &mut events);
        assert_eq!(events[0].superficial_match, found);
        assert_eq!(found.unwrap().acquisition_ref, txs[2].tx_ref);
    }

    #[test]
    fn test_custom_window() {
        let detector = SuperficialLossDetector::with_window_days(7);
        assert_eq!(detector.window_days(), 7);
        let txs = vec![dispose("2024-03-01", 0), acquire("2024-03-09", 1)];
        assert!(detector
            .find_repurchase(&txs, &loss_event(0, "2024-03-01"))
            .is_none());

        assert_eq!(SuperficialLossDetector::with_window_days(-4).window_days(), 0);
    }
}
