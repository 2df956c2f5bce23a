//! Financial request routes: submission, transitions, and read paths.
//!
//! `POST /requests/{id}/actions` is the sole transition mutator. Exchange
//! rates are resolved before the transaction opens and the domain event
//! is emitted only after it commits, so no external call ever holds the
//! transition's lock.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};
use bursar_core::authz;
use bursar_core::destination::{PaymentDetails, Platform};
use bursar_core::ledger::LedgerService;
use bursar_core::workflow::{Action, Category, Cursor, RequestKind, WorkflowEngine};
use bursar_db::entities::{audit_entries, requests};
use bursar_db::repositories::request::{
    PostActionInput, RequestRepository, SubmitRequestInput, request_facts,
};
use bursar_shared::AppError;
use bursar_shared::types::{Currency, Department};

/// Creates the request routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/requests", post(submit_request))
        .route("/requests/{request_id}", get(get_request))
        .route("/requests/{request_id}/trail", get(get_trail))
        .route("/requests/{request_id}/actions", post(post_action))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a financial request.
#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    /// "expense" or "income".
    pub kind: String,
    /// Department the money is attributed to.
    pub department: String,
    /// Spending category (expenses).
    pub category: Option<String>,
    /// Budget the request draws on.
    pub budget_id: Option<Uuid>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Free-text justification.
    pub reason: String,
    /// Payee name (expenses).
    pub payee_name: Option<String>,
    /// "bank" or "card" (expenses).
    pub platform: Option<String>,
    /// Six-digit sort code (bank).
    pub sort_code: Option<String>,
    /// Eight-digit account number (bank).
    pub account_number: Option<String>,
    /// Business account flag (bank).
    pub business: Option<bool>,
    /// Card or wallet number (card).
    pub card_number: Option<String>,
    /// Issuing bank (card).
    pub bank_name: Option<String>,
    /// Note for the CREATE audit entry.
    pub note: Option<String>,
    /// Opaque attachment handles.
    pub attachments: Option<Vec<Uuid>>,
}

/// Request body for posting an action.
#[derive(Debug, Deserialize)]
pub struct PostActionBody {
    /// Action name.
    pub action: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Opaque attachment handles.
    pub attachments: Option<Vec<Uuid>>,
    /// Receipt amount in minor units (income comments).
    pub amount: Option<i64>,
}

/// Response for a financial request.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    /// Request id.
    pub id: Uuid,
    /// "expense" or "income".
    pub kind: String,
    /// Submitting actor.
    pub owner_id: Uuid,
    /// Department the money is attributed to.
    pub department: String,
    /// Spending category.
    pub category: Option<String>,
    /// Budget drawn on.
    pub budget_id: Option<Uuid>,
    /// Currency code.
    pub currency: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Justification.
    pub reason: String,
    /// Payee name.
    pub payee_name: String,
    /// Payment platform.
    pub platform: Option<String>,
    /// Approval state.
    pub cursor: String,
    /// Partial receipts per currency (income).
    pub received: ReceivedTotals,
    /// Created at timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Per-currency receipt totals.
#[derive(Debug, Serialize)]
pub struct ReceivedTotals {
    /// GBP minor units.
    pub gbp: i64,
    /// CNY minor units.
    pub cny: i64,
}

/// Response for an audit entry.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry id.
    pub id: Uuid,
    /// Request the entry belongs to.
    pub request_id: Uuid,
    /// Acting user.
    pub actor_id: Uuid,
    /// Insertion sequence.
    pub seq: i64,
    /// Action name.
    pub action: String,
    /// Free-text note.
    pub note: Option<String>,
    /// Opaque attachment handles.
    pub attachments: serde_json::Value,
    /// Receipt amount, if any.
    pub amount: Option<i64>,
    /// Server-assigned timestamp.
    pub timestamp: String,
}

pub(crate) fn to_request_response(model: requests::Model) -> Result<RequestResponse, ApiError> {
    let cursor = Cursor::from_level(model.cursor).ok_or_else(|| {
        ApiError(AppError::Database(format!(
            "request {}: bad cursor level {}",
            model.id, model.cursor
        )))
    })?;
    Ok(RequestResponse {
        id: model.id,
        kind: model.kind,
        owner_id: model.owner_id,
        department: model.department,
        category: model.category,
        budget_id: model.budget_id,
        currency: model.currency,
        amount: model.amount,
        reason: model.reason,
        payee_name: model.payee_name,
        platform: model.platform,
        cursor: cursor.as_str().to_string(),
        received: ReceivedTotals {
            gbp: model.received_gbp,
            cny: model.received_cny,
        },
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
    })
}

fn to_entry_response(model: audit_entries::Model) -> EntryResponse {
    EntryResponse {
        id: model.id,
        request_id: model.request_id,
        actor_id: model.actor_id,
        seq: model.seq,
        action: model.action,
        note: model.note,
        attachments: model.attachments,
        amount: model.amount,
        timestamp: model.timestamp.to_rfc3339(),
    }
}

fn validation(message: impl Into<String>) -> ApiError {
    ApiError(AppError::Validation(message.into()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Submits a new request: row, CREATE audit entry, and create ledger
/// delta in one transaction.
async fn submit_request(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<SubmitRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let facts = actor.facts();
    let kind = RequestKind::parse(&body.kind)
        .ok_or_else(|| validation(format!("unknown kind {:?}", body.kind)))?;
    let department = Department::parse(&body.department)
        .ok_or_else(|| validation(format!("unknown department {:?}", body.department)))?;
    let currency = Currency::parse(&body.currency)
        .ok_or_else(|| validation(format!("unknown currency {:?}", body.currency)))?;
    let category = body
        .category
        .as_deref()
        .map(|c| Category::parse(c).ok_or_else(|| validation(format!("unknown category {c:?}"))))
        .transpose()?;

    // Destination fields are validated against their platform before
    // anything is persisted; income contracts carry no destination.
    let payment = match kind {
        RequestKind::Expense => {
            let platform = body
                .platform
                .as_deref()
                .map(|p| {
                    Platform::parse(p)
                        .ok_or_else(|| validation(format!("unknown platform {p:?}")))
                })
                .transpose()?;
            let details = PaymentDetails {
                name: body.payee_name.unwrap_or_default(),
                platform,
                sort_code: body.sort_code,
                account_number: body.account_number,
                business: body.business.unwrap_or(false),
                card_number: body.card_number,
                bank_name: body.bank_name,
            };
            details.validate()?;
            Some(details)
        }
        RequestKind::Income => None,
    };

    // The create ledger delta needs the reporting-currency equivalent;
    // resolve it before the transaction so a slow feed cannot hold locks.
    let converted = if body.budget_id.is_some() && kind == RequestKind::Expense {
        Some(
            state
                .rates
                .convert_on(body.amount, currency, Utc::now().date_naive())
                .await?,
        )
    } else {
        None
    };

    let repo = RequestRepository::new(state.db.clone());
    let record = repo
        .submit(
            &facts,
            SubmitRequestInput {
                kind,
                department,
                category,
                budget_id: body.budget_id,
                currency,
                amount: body.amount,
                reason: body.reason,
                payment,
                note: body.note,
                attachments: body.attachments.unwrap_or_default(),
            },
            converted,
        )
        .await?;

    info!(
        request_id = %record.request.id,
        actor_id = %facts.id,
        kind = %kind,
        "request submitted"
    );
    state.notifier.emit(record.event.clone());

    Ok((
        StatusCode::CREATED,
        Json(to_request_response(record.request)?),
    ))
}

/// Posts an action against a request: the sole transition mutator.
async fn post_action(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(request_id): Path<Uuid>,
    Json(body): Json<PostActionBody>,
) -> Result<impl IntoResponse, ApiError> {
    let facts = actor.facts();
    let action = Action::parse(&body.action)
        .ok_or_else(|| validation(format!("unknown action {:?}", body.action)))?;

    let repo = RequestRepository::new(state.db.clone());
    let model = repo
        .get(request_id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("request {request_id}"))))?;
    let request = request_facts(&model)?;
    let currency = Currency::parse(&model.currency)
        .ok_or_else(|| ApiError(AppError::Database(format!("request {request_id}: bad currency"))))?;

    // Authorize and compute the effect up front; the repository
    // revalidates against fresh state inside the transaction.
    let outcome = WorkflowEngine::transition(&facts, &request, action, body.amount)?;

    // Resolve the conversion only for qualifying ledger deltas. Expense
    // reversals convert at the submission date so the create delta is
    // subtracted exactly; receipts convert at their own date.
    let converted = match model.budget_id {
        Some(_) => {
            let delta_amount = outcome.receipt_amount.unwrap_or(model.amount);
            if LedgerService::delta(request.kind, action, currency, delta_amount, 0).is_some() {
                let date = if outcome.receipt_amount.is_some() {
                    Utc::now().date_naive()
                } else {
                    model.created_at.date_naive()
                };
                Some(state.rates.convert_on(delta_amount, currency, date).await?)
            } else {
                None
            }
        }
        None => None,
    };

    let record = repo
        .post_action(
            &facts,
            request_id,
            PostActionInput {
                action,
                note: body.note,
                attachments: body.attachments.unwrap_or_default(),
                amount: body.amount,
            },
            converted,
        )
        .await?;

    info!(
        request_id = %request_id,
        actor_id = %facts.id,
        action = %action,
        cursor = %record.event.resulting_cursor,
        "action posted"
    );
    state.notifier.emit(record.event.clone());

    Ok((StatusCode::CREATED, Json(to_entry_response(record.entry))))
}

/// Lists the requests the actor may read, least resolved first.
async fn list_requests(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let facts = actor.facts();
    let repo = RequestRepository::new(state.db.clone());

    let mut visible = Vec::new();
    for model in repo.list().await? {
        let request = request_facts(&model)?;
        if authz::can_read(&facts, &request) {
            visible.push(to_request_response(model)?);
        }
    }
    Ok(Json(visible))
}

/// Fetches one request, subject to read access.
async fn get_request(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, ApiError> {
    let facts = actor.facts();
    let repo = RequestRepository::new(state.db.clone());
    let model = repo
        .get(request_id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("request {request_id}"))))?;
    let request = request_facts(&model)?;
    if !authz::can_read(&facts, &request) {
        return Err(ApiError(AppError::Forbidden(
            "no read access to this request".to_string(),
        )));
    }
    Ok(Json(to_request_response(model)?))
}

/// Returns a request's audit trail, subject to read access.
async fn get_trail(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let facts = actor.facts();
    let repo = RequestRepository::new(state.db.clone());
    let model = repo
        .get(request_id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("request {request_id}"))))?;
    let request = request_facts(&model)?;
    if !authz::can_read(&facts, &request) {
        return Err(ApiError(AppError::Forbidden(
            "no read access to this request".to_string(),
        )));
    }
    let entries = repo.trail(request_id).await?;
    Ok(Json(entries.into_iter().map(to_entry_response).collect()))
}
