//! Role/department authorization predicates.
//!
//! Pure functions over explicit actor and request facts. No ambient
//! session state: every caller passes the facts in, which keeps the
//! predicates unit-testable without a request context.

use uuid::Uuid;

use bursar_shared::types::{CurrencyTotals, Department, Tier};

use crate::workflow::types::{Action, Cursor, RequestKind};

/// Facts about the acting user, as supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorFacts {
    /// Stable actor id.
    pub id: Uuid,
    /// Rank the actor approves at.
    pub approval_tier: Tier,
    /// Rank the actor submits at.
    pub application_tier: Tier,
    /// The actor's department.
    pub department: Department,
    /// Manages budgets.
    pub is_treasurer: bool,
    /// Handles income contracts.
    pub is_representative: bool,
    /// Administrative access.
    pub is_admin: bool,
}

/// Facts about a request relevant to authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFacts {
    /// Request id.
    pub id: Uuid,
    /// Expense or income.
    pub kind: RequestKind,
    /// Submitting actor.
    pub owner: Uuid,
    /// Department the money is attributed to.
    pub department: Department,
    /// Department of the submitting actor.
    pub owner_department: Department,
    /// Current approval state.
    pub cursor: Cursor,
    /// Partial receipts recorded so far (income only; zero for expenses).
    pub received: CurrencyTotals,
}

/// Returns true if the actor may view the request and its audit trail.
///
/// Expenses: president-or-senior tiers and admins see everything;
/// committee members see their department's requests; owners see their
/// own. Incomes are visible to representatives and the owner only.
#[must_use]
pub fn can_read(actor: &ActorFacts, request: &RequestFacts) -> bool {
    if actor.id == request.owner {
        return true;
    }
    match request.kind {
        RequestKind::Expense => {
            if actor.is_admin || actor.approval_tier.is_senior_or_equal(Tier::President) {
                return true;
            }
            actor.approval_tier == Tier::Committee
                && (actor.department == request.department
                    || actor.department == request.owner_department)
        }
        RequestKind::Income => actor.is_representative,
    }
}

/// Returns true if the actor may submit a request of `kind` attributed to
/// `department`.
///
/// Expense submission needs member standing or better; ordinary members
/// stay within their own department while committee-or-senior submitters
/// may file cross-department. Income contracts are filed by
/// representatives only.
#[must_use]
pub fn can_submit(actor: &ActorFacts, kind: RequestKind, department: Department) -> bool {
    match kind {
        RequestKind::Expense => {
            if !actor.application_tier.is_senior_or_equal(Tier::Member) {
                return false;
            }
            actor.application_tier.is_senior_or_equal(Tier::Committee)
                || actor.department == department
        }
        RequestKind::Income => actor.is_representative,
    }
}

/// Returns true if the actor may approve or reject the request from its
/// current state.
///
/// The approval chain is strictly descending: the actor's approval tier
/// must be exactly the tier the cursor is waiting on. Below the president
/// tier the approver must also belong to the request's department.
#[must_use]
pub fn may_approve_or_reject(actor: &ActorFacts, request: &RequestFacts) -> bool {
    let Some(required) = request.cursor.approver_tier() else {
        return false;
    };
    if actor.approval_tier != required {
        return false;
    }
    actor.approval_tier.is_senior_or_equal(Tier::President)
        || actor.department == request.department
}

/// Returns true if the actor may cancel the request (owner only).
#[must_use]
pub fn may_cancel(actor: &ActorFacts, request: &RequestFacts) -> bool {
    actor.id == request.owner
}

/// Returns true if the actor may complete the request (move the money).
#[must_use]
pub fn may_complete(actor: &ActorFacts) -> bool {
    actor.approval_tier == Tier::Audit
}

/// Returns true if the actor may record a partial receipt on an income
/// request.
#[must_use]
pub fn may_record_receipt(actor: &ActorFacts, request: &RequestFacts) -> bool {
    request.kind == RequestKind::Income
        && actor.approval_tier == Tier::Audit
        && can_read(actor, request)
}

/// Combined transition capability check for one (actor, request, action).
///
/// This is the single predicate surfaced to callers that only need a
/// yes/no answer (e.g. capability listings); the workflow engine uses the
/// finer predicates above so it can distinguish authorization failures
/// from illegal transitions.
#[must_use]
pub fn can_transition(
    actor: &ActorFacts,
    request: &RequestFacts,
    action: Action,
    amount: Option<i64>,
) -> bool {
    let terminal = request.cursor.is_terminal();
    match action {
        Action::Comment => match amount {
            Some(a) if a > 0 => !terminal && may_record_receipt(actor, request),
            _ => can_read(actor, request),
        },
        Action::Approve | Action::Reject => !terminal && may_approve_or_reject(actor, request),
        Action::Cancel => {
            !terminal
                && may_cancel(actor, request)
                && (request.kind == RequestKind::Expense || request.received.is_zero())
        }
        Action::Complete => request.cursor == Cursor::Accepted && may_complete(actor),
        Action::Create => false,
    }
}

/// Returns true if the actor may view a budget for `department`.
#[must_use]
pub fn can_view_budget(actor: &ActorFacts, department: Department) -> bool {
    if actor.is_treasurer || actor.is_admin {
        return true;
    }
    actor.approval_tier.is_senior_or_equal(Tier::Committee) && actor.department == department
}
