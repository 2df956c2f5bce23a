//! Request repository: the sole mutator of request state.
//!
//! Every transition is one database transaction: append the audit entry,
//! advance the cursor with an optimistic compare-and-swap, and apply the
//! budget delta with in-place column arithmetic. Two racing transitions
//! on the same request cannot both win the swap, and racing deltas on the
//! same budget cannot lose updates.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use bursar_core::audit::DomainEvent;
use bursar_core::authz::{ActorFacts, RequestFacts};
use bursar_core::destination::PaymentDetails;
use bursar_core::ledger::{BudgetDelta, LedgerService};
use bursar_core::workflow::{
    Action, Category, Cursor, RequestKind, WorkflowEngine, WorkflowError,
};
use bursar_shared::types::{Currency, CurrencyTotals, Department};

use crate::entities::{audit_entries, budgets, requests};

/// Input for submitting a new request.
///
/// Payment details must already be validated by the caller; validation
/// errors surface before anything is persisted.
#[derive(Debug, Clone)]
pub struct SubmitRequestInput {
    /// Expense or income.
    pub kind: RequestKind,
    /// Department the money is attributed to.
    pub department: Department,
    /// Spending category (expenses).
    pub category: Option<Category>,
    /// Budget the request draws on, if any.
    pub budget_id: Option<Uuid>,
    /// Native currency of the amount.
    pub currency: Currency,
    /// Amount in minor units.
    pub amount: i64,
    /// Free-text justification.
    pub reason: String,
    /// Destination details (expenses).
    pub payment: Option<PaymentDetails>,
    /// Note attached to the CREATE audit entry.
    pub note: Option<String>,
    /// Opaque attachment handles.
    pub attachments: Vec<Uuid>,
}

/// Input for posting an action against an existing request.
#[derive(Debug, Clone)]
pub struct PostActionInput {
    /// The action to perform.
    pub action: Action,
    /// Free-text note for the audit entry.
    pub note: Option<String>,
    /// Opaque attachment handles.
    pub attachments: Vec<Uuid>,
    /// Receipt amount (income comments only).
    pub amount: Option<i64>,
}

/// A committed transition: the updated request, its audit entry, and the
/// domain event to hand to the notifier.
#[derive(Debug, Clone)]
pub struct TransitionRecord {
    /// The request after the transition.
    pub request: requests::Model,
    /// The audit entry recording the transition.
    pub entry: audit_entries::Model,
    /// Event for the external notifier; emit only after commit.
    pub event: DomainEvent,
}

/// Builds the authorization facts for a stored request.
///
/// # Errors
///
/// Returns `WorkflowError::Database` if stored enum columns fail to
/// parse (data corruption).
pub fn request_facts(model: &requests::Model) -> Result<RequestFacts, WorkflowError> {
    let corrupt = |what: &str, value: &str| {
        WorkflowError::Database(format!("request {}: bad {what} value {value:?}", model.id))
    };
    Ok(RequestFacts {
        id: model.id,
        kind: RequestKind::parse(&model.kind).ok_or_else(|| corrupt("kind", &model.kind))?,
        owner: model.owner_id,
        department: Department::parse(&model.department)
            .ok_or_else(|| corrupt("department", &model.department))?,
        owner_department: Department::parse(&model.owner_department)
            .ok_or_else(|| corrupt("owner_department", &model.owner_department))?,
        cursor: Cursor::from_level(model.cursor)
            .ok_or_else(|| corrupt("cursor", &model.cursor.to_string()))?,
        received: CurrencyTotals {
            gbp: model.received_gbp,
            cny: model.received_cny,
        },
    })
}

/// Request repository: submission, transitions, and read paths.
#[derive(Debug, Clone)]
pub struct RequestRepository {
    db: DatabaseConnection,
}

impl RequestRepository {
    /// Creates a new request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits a new request: inserts the row, writes the CREATE audit
    /// entry, and applies the create ledger delta, all in one
    /// transaction.
    ///
    /// `converted` is the amount in reporting-currency minor units at the
    /// submission date; required when an expense draws on a budget.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::NotAuthorized` - submission predicates reject
    ///   the actor
    /// * `WorkflowError::InvalidAmount` - non-positive amount
    /// * `WorkflowError::BudgetNotFound` - unknown budget id
    /// * `WorkflowError::ConversionUnavailable` - a qualifying ledger
    ///   delta had no converted amount
    /// * `WorkflowError::Database` - storage failure
    pub async fn submit(
        &self,
        actor: &ActorFacts,
        input: SubmitRequestInput,
        converted: Option<i64>,
    ) -> Result<TransitionRecord, WorkflowError> {
        let cursor =
            WorkflowEngine::authorize_submission(actor, input.kind, input.department, input.amount)?;

        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(budget_id) = input.budget_id {
            let exists = budgets::Entity::find_by_id(budget_id)
                .one(&txn)
                .await
                .map_err(db_err)?
                .is_some();
            if !exists {
                return Err(WorkflowError::BudgetNotFound(budget_id));
            }
        }

        let now = Utc::now();
        let payment = input.payment.unwrap_or_default();
        let request = requests::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(input.kind.as_str().to_string()),
            owner_id: Set(actor.id),
            owner_department: Set(actor.department.as_str().to_string()),
            department: Set(input.department.as_str().to_string()),
            category: Set(input.category.map(|c| c.as_str().to_string())),
            budget_id: Set(input.budget_id),
            currency: Set(input.currency.as_str().to_string()),
            amount: Set(input.amount),
            reason: Set(input.reason),
            payee_name: Set(payment.name),
            platform: Set(payment.platform.map(|p| p.as_str().to_string())),
            sort_code: Set(payment.sort_code),
            account_number: Set(payment.account_number),
            business: Set(payment.business),
            card_number: Set(payment.card_number),
            bank_name: Set(payment.bank_name),
            cursor: Set(cursor.level()),
            received_gbp: Set(0),
            received_cny: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let entry = insert_entry(
            &txn,
            request.id,
            actor.id,
            Action::Create,
            input.note,
            &input.attachments,
            None,
        )
        .await?;

        if let Some(budget_id) = input.budget_id {
            apply_delta_if_qualifying(
                &txn,
                budget_id,
                input.kind,
                Action::Create,
                input.currency,
                input.amount,
                converted,
            )
            .await?;
        }

        txn.commit().await.map_err(db_err)?;

        let event = DomainEvent {
            request_id: request.id,
            actor_id: actor.id,
            action: Action::Create,
            resulting_cursor: cursor,
            timestamp: now,
        };
        Ok(TransitionRecord {
            request,
            entry,
            event,
        })
    }

    /// Posts an action against a request: the sole transition mutator.
    ///
    /// `converted` is the reporting-currency equivalent of the delta
    /// amount (the original request amount for expense reversals, the
    /// receipt amount for income receipts); required whenever the
    /// request draws on a budget and the action qualifies for a ledger
    /// delta.
    ///
    /// # Errors
    ///
    /// * `WorkflowError::RequestNotFound` - unknown request id
    /// * `WorkflowError::InvalidTransition` / `NotAuthorized` /
    ///   `InvalidAmount` - the engine rejected the action
    /// * `WorkflowError::TransitionConflict` - a concurrent transition
    ///   moved the cursor first
    /// * `WorkflowError::ConversionUnavailable` - qualifying delta with
    ///   no converted amount
    /// * `WorkflowError::Database` - storage failure
    pub async fn post_action(
        &self,
        actor: &ActorFacts,
        request_id: Uuid,
        input: PostActionInput,
        converted: Option<i64>,
    ) -> Result<TransitionRecord, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut request = requests::Entity::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::RequestNotFound(request_id))?;

        let facts = request_facts(&request)?;
        let outcome = WorkflowEngine::transition(actor, &facts, input.action, input.amount)?;

        let currency = Currency::parse(&request.currency).ok_or_else(|| {
            WorkflowError::Database(format!(
                "request {}: bad currency value {:?}",
                request.id, request.currency
            ))
        })?;

        let entry = insert_entry(
            &txn,
            request.id,
            actor.id,
            input.action,
            input.note,
            &input.attachments,
            outcome.receipt_amount,
        )
        .await?;

        // Cursor advance: compare-and-swap against the level we read, so
        // exactly one of two racing transitions succeeds.
        if let Some(new_cursor) = outcome.new_cursor {
            let updated = requests::Entity::update_many()
                .col_expr(requests::Column::Cursor, Expr::value(new_cursor.level()))
                .col_expr(requests::Column::UpdatedAt, Expr::value(entry.timestamp))
                .filter(requests::Column::Id.eq(request.id))
                .filter(requests::Column::Cursor.eq(facts.cursor.level()))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            if updated.rows_affected != 1 {
                return Err(WorkflowError::TransitionConflict(request.id));
            }
            request.cursor = new_cursor.level();
            request.updated_at = entry.timestamp;
        }

        // Receipt accumulation guards on the cursor too: a receipt must
        // not land after a concurrent cancel resolved the request.
        if let Some(receipt) = outcome.receipt_amount {
            let column = match currency {
                Currency::Gbp => requests::Column::ReceivedGbp,
                Currency::Cny => requests::Column::ReceivedCny,
            };
            let updated = requests::Entity::update_many()
                .col_expr(column, Expr::col(column).add(receipt))
                .col_expr(requests::Column::UpdatedAt, Expr::value(entry.timestamp))
                .filter(requests::Column::Id.eq(request.id))
                .filter(requests::Column::Cursor.eq(facts.cursor.level()))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            if updated.rows_affected != 1 {
                return Err(WorkflowError::TransitionConflict(request.id));
            }
            match currency {
                Currency::Gbp => request.received_gbp += receipt,
                Currency::Cny => request.received_cny += receipt,
            }
            request.updated_at = entry.timestamp;
        }

        if let Some(budget_id) = request.budget_id {
            let delta_amount = outcome.receipt_amount.unwrap_or(request.amount);
            apply_delta_if_qualifying(
                &txn,
                budget_id,
                facts.kind,
                input.action,
                currency,
                delta_amount,
                converted,
            )
            .await?;
        }

        txn.commit().await.map_err(db_err)?;

        let event = DomainEvent {
            request_id: request.id,
            actor_id: actor.id,
            action: input.action,
            resulting_cursor: outcome.new_cursor.unwrap_or(facts.cursor),
            timestamp: entry.timestamp.to_utc(),
        };
        Ok(TransitionRecord {
            request,
            entry,
            event,
        })
    }

    /// Fetches a request by id.
    pub async fn get(&self, request_id: Uuid) -> Result<Option<requests::Model>, WorkflowError> {
        requests::Entity::find_by_id(request_id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists all requests, least resolved first (read-path callers filter
    /// by authorization).
    pub async fn list(&self) -> Result<Vec<requests::Model>, WorkflowError> {
        requests::Entity::find()
            .order_by_desc(requests::Column::Cursor)
            .order_by_desc(requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists all requests drawing on a budget.
    pub async fn list_for_budget(
        &self,
        budget_id: Uuid,
    ) -> Result<Vec<requests::Model>, WorkflowError> {
        requests::Entity::find()
            .filter(requests::Column::BudgetId.eq(budget_id))
            .order_by_desc(requests::Column::Cursor)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Returns a request's audit trail ordered by timestamp, ties broken
    /// by insertion sequence.
    pub async fn trail(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<audit_entries::Model>, WorkflowError> {
        audit_entries::Entity::find()
            .filter(audit_entries::Column::RequestId.eq(request_id))
            .order_by_asc(audit_entries::Column::Timestamp)
            .order_by_asc(audit_entries::Column::Seq)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}

fn db_err(e: sea_orm::DbErr) -> WorkflowError {
    WorkflowError::Database(e.to_string())
}

async fn insert_entry(
    txn: &DatabaseTransaction,
    request_id: Uuid,
    actor_id: Uuid,
    action: Action,
    note: Option<String>,
    attachments: &[Uuid],
    amount: Option<i64>,
) -> Result<audit_entries::Model, WorkflowError> {
    let attachments =
        serde_json::to_value(attachments).map_err(|e| WorkflowError::Database(e.to_string()))?;
    audit_entries::ActiveModel {
        id: Set(Uuid::new_v4()),
        request_id: Set(request_id),
        actor_id: Set(actor_id),
        action: Set(action.as_str().to_string()),
        note: Set(note),
        attachments: Set(attachments),
        amount: Set(amount),
        timestamp: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(db_err)
}

/// Applies the ledger delta for a qualifying transition with atomic
/// in-place arithmetic on the budget row.
///
/// Fails closed: a qualifying delta with no converted amount aborts the
/// transaction instead of committing a zero or stale delta.
async fn apply_delta_if_qualifying(
    txn: &DatabaseTransaction,
    budget_id: Uuid,
    kind: RequestKind,
    action: Action,
    currency: Currency,
    amount: i64,
    converted: Option<i64>,
) -> Result<(), WorkflowError> {
    let Some(delta) =
        LedgerService::delta(kind, action, currency, amount, converted.unwrap_or(0))
    else {
        return Ok(());
    };
    if converted.is_none() {
        return Err(WorkflowError::ConversionUnavailable);
    }
    apply_budget_delta(txn, budget_id, &delta).await
}

async fn apply_budget_delta<C: ConnectionTrait>(
    conn: &C,
    budget_id: Uuid,
    delta: &BudgetDelta,
) -> Result<(), WorkflowError> {
    use budgets::Column;

    let mut update = budgets::Entity::update_many()
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(budget_id));
    for (column, value) in [
        (Column::Spent, delta.spent),
        (Column::Received, delta.received),
        (Column::SpentGbp, delta.spent_actual.gbp),
        (Column::SpentCny, delta.spent_actual.cny),
        (Column::ReceivedGbp, delta.received_actual.gbp),
        (Column::ReceivedCny, delta.received_actual.cny),
    ] {
        if value != 0 {
            update = update.col_expr(column, Expr::col(column).add(value));
        }
    }

    let result = update.exec(conn).await.map_err(db_err)?;
    if result.rows_affected != 1 {
        return Err(WorkflowError::BudgetNotFound(budget_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn model(kind: &str, cursor: i16) -> requests::Model {
        let ts = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        requests::Model {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            owner_id: Uuid::new_v4(),
            owner_department: "arts".to_string(),
            department: "arts".to_string(),
            category: Some("reimbursement".to_string()),
            budget_id: None,
            currency: "GBP".to_string(),
            amount: 5000,
            reason: "venue deposit".to_string(),
            payee_name: "Campus Print Ltd".to_string(),
            platform: Some("bank".to_string()),
            sort_code: Some("123456".to_string()),
            account_number: Some("12345678".to_string()),
            business: false,
            card_number: None,
            bank_name: None,
            cursor,
            received_gbp: 0,
            received_cny: 0,
            created_at: ts.into(),
            updated_at: ts.into(),
        }
    }

    #[test]
    fn test_request_facts_parses_stored_columns() {
        let m = model("expense", Cursor::AwaitCommittee.level());
        let facts = request_facts(&m).expect("facts should parse");
        assert_eq!(facts.kind, RequestKind::Expense);
        assert_eq!(facts.department, Department::Arts);
        assert_eq!(facts.cursor, Cursor::AwaitCommittee);
        assert!(facts.received.is_zero());
    }

    #[test]
    fn test_request_facts_rejects_corrupt_kind() {
        let m = model("transfer", 4);
        assert!(matches!(
            request_facts(&m),
            Err(WorkflowError::Database(_))
        ));
    }

    #[test]
    fn test_request_facts_rejects_corrupt_cursor() {
        let m = model("expense", 9);
        assert!(matches!(
            request_facts(&m),
            Err(WorkflowError::Database(_))
        ));
    }
}
