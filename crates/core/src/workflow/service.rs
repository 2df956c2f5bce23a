//! State transition logic for the request approval chain.
//!
//! The engine is pure: it decides what a transition does, given explicit
//! actor and request facts. Persisting the outcome atomically (audit
//! entry, cursor compare-and-swap, ledger delta) is the repository's job.

use bursar_shared::types::Tier;

use crate::authz::{
    self, ActorFacts, RequestFacts,
};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Action, Cursor, RequestKind};

/// The computed effect of a valid transition.
///
/// `new_cursor` is `None` for plain comments; `receipt_amount` is set when
/// an income partial receipt was recorded (in the request's currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The action performed.
    pub action: Action,
    /// The cursor the request moves to, if it moves.
    pub new_cursor: Option<Cursor>,
    /// Partial receipt recorded against the request's currency.
    pub receipt_amount: Option<i64>,
}

impl TransitionOutcome {
    const fn comment() -> Self {
        Self {
            action: Action::Comment,
            new_cursor: None,
            receipt_amount: None,
        }
    }

    const fn receipt(amount: i64) -> Self {
        Self {
            action: Action::Comment,
            new_cursor: None,
            receipt_amount: Some(amount),
        }
    }

    const fn moved(action: Action, cursor: Cursor) -> Self {
        Self {
            action,
            new_cursor: Some(cursor),
            receipt_amount: None,
        }
    }
}

/// Stateless engine validating and computing request transitions.
pub struct WorkflowEngine;

impl WorkflowEngine {
    /// The cursor a freshly submitted request starts at.
    ///
    /// Expense applications enter the chain at the submitter's application
    /// tier; income contracts skip the chain and start accepted.
    #[must_use]
    pub const fn submission_cursor(kind: RequestKind, application_tier: Tier) -> Cursor {
        match kind {
            RequestKind::Expense => Cursor::for_tier(application_tier),
            RequestKind::Income => Cursor::Accepted,
        }
    }

    /// Validates a submission and returns the initial cursor.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::NotAuthorized` if the actor may not submit
    /// this kind of request for the department, or
    /// `WorkflowError::InvalidAmount` for a non-positive amount.
    pub fn authorize_submission(
        actor: &ActorFacts,
        kind: RequestKind,
        department: bursar_shared::types::Department,
        amount: i64,
    ) -> Result<Cursor, WorkflowError> {
        if amount <= 0 {
            return Err(WorkflowError::InvalidAmount { amount });
        }
        if !authz::can_submit(actor, kind, department) {
            return Err(WorkflowError::NotAuthorized {
                action: Action::Create,
            });
        }
        Ok(Self::submission_cursor(kind, actor.application_tier))
    }

    /// Validates an action against a request and computes its effect.
    ///
    /// State legality is checked before actor authorization, so a caller
    /// can distinguish "this action makes no sense here" from "you may
    /// not do this".
    ///
    /// # Errors
    ///
    /// * `WorkflowError::InvalidTransition` - action not legal from the
    ///   current cursor (terminal request, skip-level approval target,
    ///   receipt on an expense, cancel after a receipt)
    /// * `WorkflowError::NotAuthorized` - the authorization predicates
    ///   reject the actor
    /// * `WorkflowError::InvalidAmount` - negative comment amount
    pub fn transition(
        actor: &ActorFacts,
        request: &RequestFacts,
        action: Action,
        amount: Option<i64>,
    ) -> Result<TransitionOutcome, WorkflowError> {
        let invalid = || WorkflowError::InvalidTransition {
            action,
            from: request.cursor,
        };
        let unauthorized = || WorkflowError::NotAuthorized { action };

        match action {
            // Submissions go through `authorize_submission`, never here.
            Action::Create => Err(invalid()),

            Action::Comment => match amount {
                Some(a) if a < 0 => Err(WorkflowError::InvalidAmount { amount: a }),
                Some(a) if a > 0 => {
                    if request.kind != RequestKind::Income || request.cursor.is_terminal() {
                        return Err(invalid());
                    }
                    if !authz::may_record_receipt(actor, request) {
                        return Err(unauthorized());
                    }
                    Ok(TransitionOutcome::receipt(a))
                }
                _ => {
                    if !authz::can_read(actor, request) {
                        return Err(unauthorized());
                    }
                    Ok(TransitionOutcome::comment())
                }
            },

            Action::Approve | Action::Reject => {
                if request.cursor.is_terminal() || request.cursor.approver_tier().is_none() {
                    return Err(invalid());
                }
                if !authz::may_approve_or_reject(actor, request) {
                    return Err(unauthorized());
                }
                let next = if action == Action::Approve {
                    Cursor::for_tier(actor.approval_tier)
                } else {
                    Cursor::Declined
                };
                Ok(TransitionOutcome::moved(action, next))
            }

            Action::Cancel => {
                if request.cursor.is_terminal() {
                    return Err(invalid());
                }
                if request.kind == RequestKind::Income && !request.received.is_zero() {
                    return Err(invalid());
                }
                if !authz::may_cancel(actor, request) {
                    return Err(unauthorized());
                }
                Ok(TransitionOutcome::moved(action, Cursor::Declined))
            }

            Action::Complete => {
                if request.cursor != Cursor::Accepted {
                    return Err(invalid());
                }
                if !authz::may_complete(actor) {
                    return Err(unauthorized());
                }
                Ok(TransitionOutcome::moved(action, Cursor::Completed))
            }
        }
    }
}
