//! Budget delta computation for workflow transitions.

use bursar_shared::types::{Currency, CurrencyTotals};

use crate::workflow::types::{Action, RequestKind};

/// The net effect of one transition on a budget's totals.
///
/// `spent` and `received` are in reporting-currency minor units; the
/// `*_actual` records track per-currency raw amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetDelta {
    /// Reporting-currency delta to the spent total.
    pub spent: i64,
    /// Reporting-currency delta to the received total.
    pub received: i64,
    /// Per-currency delta to the raw spent amounts.
    pub spent_actual: CurrencyTotals,
    /// Per-currency delta to the raw received amounts.
    pub received_actual: CurrencyTotals,
}

impl BudgetDelta {
    /// Returns true if applying this delta changes nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.spent == 0
            && self.received == 0
            && self.spent_actual.is_zero()
            && self.received_actual.is_zero()
    }
}

/// Stateless service computing budget deltas from transitions.
pub struct LedgerService;

impl LedgerService {
    /// Computes the budget delta for a transition, if the transition
    /// qualifies.
    ///
    /// The rule table:
    /// - expense + create: spent increases by the converted amount, raw
    ///   spent by the native amount
    /// - expense + reject/cancel: the create effect is reversed exactly
    /// - income + positive receipt comment: received increases
    ///
    /// Everything else (approvals, completions, plain comments) leaves
    /// the budget untouched, and `None` is returned.
    #[must_use]
    pub fn delta(
        kind: RequestKind,
        action: Action,
        currency: Currency,
        amount: i64,
        converted: i64,
    ) -> Option<BudgetDelta> {
        match (kind, action) {
            (RequestKind::Expense, Action::Create) => {
                Some(Self::spent_delta(currency, amount, converted))
            }
            (RequestKind::Expense, Action::Reject | Action::Cancel) => {
                Some(Self::spent_delta(currency, -amount, -converted))
            }
            (RequestKind::Income, Action::Comment) if amount > 0 => {
                let mut delta = BudgetDelta {
                    received: converted,
                    ..BudgetDelta::default()
                };
                delta.received_actual.add(currency, amount);
                Some(delta)
            }
            _ => None,
        }
    }

    fn spent_delta(currency: Currency, amount: i64, converted: i64) -> BudgetDelta {
        let mut delta = BudgetDelta {
            spent: converted,
            ..BudgetDelta::default()
        };
        delta.spent_actual.add(currency, amount);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_create_increases_spent() {
        let delta =
            LedgerService::delta(RequestKind::Expense, Action::Create, Currency::Gbp, 5000, 5000)
                .expect("create qualifies");
        assert_eq!(delta.spent, 5000);
        assert_eq!(delta.spent_actual.get(Currency::Gbp), 5000);
        assert_eq!(delta.spent_actual.get(Currency::Cny), 0);
        assert_eq!(delta.received, 0);
    }

    #[test]
    fn test_expense_cancel_reverses_create() {
        let create =
            LedgerService::delta(RequestKind::Expense, Action::Create, Currency::Cny, 2000, 220)
                .unwrap();
        let cancel =
            LedgerService::delta(RequestKind::Expense, Action::Cancel, Currency::Cny, 2000, 220)
                .unwrap();
        assert_eq!(create.spent, -cancel.spent);
        assert_eq!(
            create.spent_actual.get(Currency::Cny),
            -cancel.spent_actual.get(Currency::Cny)
        );
    }

    #[test]
    fn test_expense_reject_reverses_create() {
        let delta =
            LedgerService::delta(RequestKind::Expense, Action::Reject, Currency::Gbp, 5000, 5000)
                .unwrap();
        assert_eq!(delta.spent, -5000);
        assert_eq!(delta.spent_actual.get(Currency::Gbp), -5000);
    }

    #[test]
    fn test_income_receipt_increases_received() {
        let delta =
            LedgerService::delta(RequestKind::Income, Action::Comment, Currency::Cny, 2000, 220)
                .expect("positive receipt qualifies");
        assert_eq!(delta.received, 220);
        assert_eq!(delta.received_actual.get(Currency::Cny), 2000);
        assert_eq!(delta.spent, 0);
        assert!(delta.spent_actual.is_zero());
    }

    #[test]
    fn test_non_qualifying_actions_produce_no_delta() {
        for action in [Action::Approve, Action::Complete, Action::Comment] {
            assert_eq!(
                LedgerService::delta(RequestKind::Expense, action, Currency::Gbp, 5000, 5000),
                None,
                "expense {action} must not touch the budget"
            );
        }
        // Income create and cancel move nothing either.
        for action in [Action::Create, Action::Cancel, Action::Reject] {
            assert_eq!(
                LedgerService::delta(RequestKind::Income, action, Currency::Cny, 2000, 220),
                None,
                "income {action} must not touch the budget"
            );
        }
    }

    #[test]
    fn test_zero_amount_comment_is_not_a_receipt() {
        assert_eq!(
            LedgerService::delta(RequestKind::Income, Action::Comment, Currency::Cny, 0, 0),
            None
        );
    }
}
