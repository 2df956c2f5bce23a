//! Property-based tests for the workflow engine.
//!
//! Validates that the cursor can only move along the transition table,
//! whatever combination of actor facts, request state, and action is
//! thrown at the engine.

use proptest::prelude::*;
use uuid::Uuid;

use bursar_shared::types::{CurrencyTotals, Department, Tier};

use crate::authz::{ActorFacts, RequestFacts};
use crate::workflow::service::WorkflowEngine;
use crate::workflow::types::{Action, Cursor, RequestKind};

fn arb_tier() -> impl Strategy<Value = Tier> {
    prop_oneof![
        Just(Tier::Audit),
        Just(Tier::President),
        Just(Tier::Committee),
        Just(Tier::Member),
        Just(Tier::Visitor),
    ]
}

fn arb_department() -> impl Strategy<Value = Department> {
    prop_oneof![
        Just(Department::President),
        Just(Department::Treasurer),
        Just(Department::Arts),
        Just(Department::Media),
        Just(Department::Sports),
        Just(Department::General),
    ]
}

fn arb_cursor() -> impl Strategy<Value = Cursor> {
    prop_oneof![
        Just(Cursor::Declined),
        Just(Cursor::Completed),
        Just(Cursor::Accepted),
        Just(Cursor::AwaitAudit),
        Just(Cursor::AwaitPresident),
        Just(Cursor::AwaitCommittee),
        Just(Cursor::AwaitMember),
    ]
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

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

prop_compose! {
    fn arb_actor()(
        id in arb_uuid(),
        approval_tier in arb_tier(),
        application_tier in arb_tier(),
        department in arb_department(),
        is_treasurer in any::<bool>(),
        is_representative in any::<bool>(),
        is_admin in any::<bool>(),
    ) -> ActorFacts {
        ActorFacts {
            id,
            approval_tier,
            application_tier,
            department,
            is_treasurer,
            is_representative,
            is_admin,
        }
    }
}

prop_compose! {
    fn arb_request()(
        id in arb_uuid(),
        kind in arb_kind(),
        owner in arb_uuid(),
        department in arb_department(),
        owner_department in arb_department(),
        cursor in arb_cursor(),
        received_cny in 0i64..10_000,
    ) -> RequestFacts {
        let mut received = CurrencyTotals::ZERO;
        if kind == RequestKind::Income {
            received.add(bursar_shared::types::Currency::Cny, received_cny);
        }
        RequestFacts {
            id,
            kind,
            owner,
            department,
            owner_department,
            cursor,
            received,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Whatever the inputs, a successful transition only lands on a state
    /// reachable by the transition table from the current cursor.
    #[test]
    fn prop_cursor_moves_only_along_table(
        actor in arb_actor(),
        request in arb_request(),
        action in arb_action(),
        amount in proptest::option::of(-1_000i64..100_000),
    ) {
        if let Ok(outcome) = WorkflowEngine::transition(&actor, &request, action, amount) {
            match outcome.new_cursor {
                None => {
                    // Only comments leave the cursor alone.
                    prop_assert_eq!(outcome.action, Action::Comment);
                }
                Some(next) => {
                    prop_assert!(!request.cursor.is_terminal());
                    match action {
                        Action::Approve => {
                            // Approval descends exactly one level.
                            prop_assert_eq!(next.level(), request.cursor.level() - 1);
                        }
                        Action::Reject | Action::Cancel => {
                            prop_assert_eq!(next, Cursor::Declined);
                        }
                        Action::Complete => {
                            prop_assert_eq!(request.cursor, Cursor::Accepted);
                            prop_assert_eq!(next, Cursor::Completed);
                        }
                        Action::Comment | Action::Create => {
                            prop_assert!(false, "{} must not move the cursor", action);
                        }
                    }
                }
            }
        }
    }

    /// Terminal requests admit no cursor-changing action.
    #[test]
    fn prop_terminal_states_absorb(
        actor in arb_actor(),
        mut request in arb_request(),
        action in arb_action(),
    ) {
        prop_assume!(action.changes_cursor());
        request.cursor = if request.id.as_u128() % 2 == 0 {
            Cursor::Completed
        } else {
            Cursor::Declined
        };
        prop_assert!(WorkflowEngine::transition(&actor, &request, action, None).is_err());
    }

    /// A successful approval implies the actor sat exactly one tier above
    /// the request's level, and department rules held.
    #[test]
    fn prop_approval_gate(
        actor in arb_actor(),
        request in arb_request(),
    ) {
        if WorkflowEngine::transition(&actor, &request, Action::Approve, None).is_ok() {
            prop_assert_eq!(request.cursor.approver_tier(), Some(actor.approval_tier));
            prop_assert!(
                actor.approval_tier.is_senior_or_equal(Tier::President)
                    || actor.department == request.department
            );
        }
    }

    /// Receipts only ever succeed for audit-tier actors on live income
    /// requests, and only with a positive amount.
    #[test]
    fn prop_receipt_gate(
        actor in arb_actor(),
        request in arb_request(),
        amount in -1_000i64..100_000,
    ) {
        if let Ok(outcome) =
            WorkflowEngine::transition(&actor, &request, Action::Comment, Some(amount))
        {
            if let Some(received) = outcome.receipt_amount {
                prop_assert!(received > 0);
                prop_assert_eq!(request.kind, RequestKind::Income);
                prop_assert_eq!(actor.approval_tier, Tier::Audit);
                prop_assert!(!request.cursor.is_terminal());
            }
        }
    }

    /// Submission cursors match the submitter's application tier for
    /// expenses; incomes always start accepted.
    #[test]
    fn prop_submission_cursor(kind in arb_kind(), tier in arb_tier()) {
        let cursor = WorkflowEngine::submission_cursor(kind, tier);
        match kind {
            RequestKind::Expense => prop_assert_eq!(cursor, Cursor::for_tier(tier)),
            RequestKind::Income => prop_assert_eq!(cursor, Cursor::Accepted),
        }
    }
}
