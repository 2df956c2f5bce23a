//! Property-based tests for budget delta rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use bursar_shared::types::Currency;

use crate::currency::convert_minor;
use crate::ledger::delta::LedgerService;
use crate::workflow::types::{Action, RequestKind};

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Gbp), Just(Currency::Cny)]
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Comment),
        Just(Action::Approve),
        Just(Action::Reject),
        Just(Action::Create),
        Just(Action::Cancel),
        Just(Action::Complete),
    ]
}

fn arb_kind() -> impl Strategy<Value = RequestKind> {
    prop_oneof![Just(RequestKind::Expense), Just(RequestKind::Income)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A create delta followed by its reject/cancel reversal nets to zero
    /// in both the reporting total and every raw currency bucket.
    #[test]
    fn prop_reversal_cancels_create(
        currency in arb_currency(),
        amount in 1i64..10_000_000,
        rate_milli in 1i64..5_000,
    ) {
        let rate = Decimal::new(rate_milli, 3);
        let converted = convert_minor(amount, rate);
        let create =
            LedgerService::delta(RequestKind::Expense, Action::Create, currency, amount, converted)
                .unwrap();
        for reversal_action in [Action::Reject, Action::Cancel] {
            let reversal = LedgerService::delta(
                RequestKind::Expense,
                reversal_action,
                currency,
                amount,
                converted,
            )
            .unwrap();
            prop_assert_eq!(create.spent + reversal.spent, 0);
            for c in Currency::ALL {
                prop_assert_eq!(
                    create.spent_actual.get(c) + reversal.spent_actual.get(c),
                    0
                );
            }
        }
    }

    /// Expense deltas never touch received totals and income deltas never
    /// touch spent totals.
    #[test]
    fn prop_deltas_stay_in_their_lane(
        kind in arb_kind(),
        action in arb_action(),
        currency in arb_currency(),
        amount in 1i64..10_000_000,
        converted in 1i64..10_000_000,
    ) {
        if let Some(delta) = LedgerService::delta(kind, action, currency, amount, converted) {
            match kind {
                RequestKind::Expense => {
                    prop_assert_eq!(delta.received, 0);
                    prop_assert!(delta.received_actual.is_zero());
                }
                RequestKind::Income => {
                    prop_assert_eq!(delta.spent, 0);
                    prop_assert!(delta.spent_actual.is_zero());
                }
            }
            prop_assert!(!delta.is_zero());
        }
    }

    /// The raw-bucket delta always lands in exactly the triggering
    /// currency.
    #[test]
    fn prop_raw_delta_single_currency(
        currency in arb_currency(),
        amount in 1i64..10_000_000,
        converted in 1i64..10_000_000,
    ) {
        let delta =
            LedgerService::delta(RequestKind::Expense, Action::Create, currency, amount, converted)
                .unwrap();
        for c in Currency::ALL {
            let expected = if c == currency { amount } else { 0 };
            prop_assert_eq!(delta.spent_actual.get(c), expected);
        }
    }
}
