//! Budget routes: departmental envelopes and their running totals.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::requests::RequestResponse;
use crate::{AppState, middleware::AuthUser};
use bursar_core::authz;
use bursar_db::entities::budgets;
use bursar_db::repositories::budget::{BudgetError, BudgetRepository, CreateBudgetInput};
use bursar_db::repositories::exchange_rate::ExchangeRateRepository;
use bursar_db::repositories::request::RequestRepository;
use bursar_shared::AppError;
use bursar_shared::types::{Currency, Department};

/// Creates the budget routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route("/budgets", post(create_budget))
        .route("/budgets/recalculate", post(recalculate_budgets))
        .route("/budgets/{budget_id}", get(get_budget))
        .route("/budgets/{budget_id}/requests", get(list_budget_requests))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetBody {
    /// Owning department.
    pub department: String,
    /// What the budget is for.
    pub reason: String,
    /// Ceiling in reporting-currency minor units.
    pub amount: i64,
}

/// Response for a budget.
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    /// Budget id.
    pub id: Uuid,
    /// Owning department.
    pub department: String,
    /// What the budget is for.
    pub reason: String,
    /// Ceiling in reporting-currency minor units.
    pub amount: i64,
    /// Aggregated spend, reporting currency.
    pub spent: i64,
    /// Aggregated receipts, reporting currency.
    pub received: i64,
    /// Raw per-currency spend.
    pub spent_actual: TotalsResponse,
    /// Raw per-currency receipts.
    pub received_actual: TotalsResponse,
    /// Created at timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Per-currency totals.
#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    /// GBP minor units.
    pub gbp: i64,
    /// CNY minor units.
    pub cny: i64,
}

fn to_budget_response(model: budgets::Model) -> BudgetResponse {
    BudgetResponse {
        id: model.id,
        department: model.department,
        reason: model.reason,
        amount: model.amount,
        spent: model.spent,
        received: model.received,
        spent_actual: TotalsResponse {
            gbp: model.spent_gbp,
            cny: model.spent_cny,
        },
        received_actual: TotalsResponse {
            gbp: model.received_gbp,
            cny: model.received_cny,
        },
        created_at: model.created_at.to_rfc3339(),
        updated_at: model.updated_at.to_rfc3339(),
    }
}

fn budget_department(model: &budgets::Model) -> Result<Department, ApiError> {
    Department::parse(&model.department).ok_or_else(|| {
        ApiError(AppError::Database(format!(
            "budget {}: bad department {:?}",
            model.id, model.department
        )))
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Lists the budgets the actor may view.
async fn list_budgets(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<BudgetResponse>>, ApiError> {
    let facts = actor.facts();
    let repo = BudgetRepository::new(state.db.clone());

    let mut visible = Vec::new();
    for model in repo.list().await? {
        let department = budget_department(&model)?;
        if authz::can_view_budget(&facts, department) {
            visible.push(to_budget_response(model));
        }
    }
    Ok(Json(visible))
}

/// Creates a budget envelope (treasurer or admin).
async fn create_budget(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<CreateBudgetBody>,
) -> Result<impl IntoResponse, ApiError> {
    let facts = actor.facts();
    if !facts.is_treasurer && !facts.is_admin {
        return Err(ApiError(AppError::Forbidden(
            "treasurer role required".to_string(),
        )));
    }
    let department = Department::parse(&body.department).ok_or_else(|| {
        ApiError(AppError::Validation(format!(
            "unknown department {:?}",
            body.department
        )))
    })?;
    if body.amount < 0 {
        return Err(ApiError(AppError::Validation(
            "budget ceiling must not be negative".to_string(),
        )));
    }

    let repo = BudgetRepository::new(state.db.clone());
    let model = repo
        .create(CreateBudgetInput {
            department,
            reason: body.reason,
            amount: body.amount,
        })
        .await?;
    info!(budget_id = %model.id, department = %department, "budget created");
    Ok((StatusCode::CREATED, Json(to_budget_response(model))))
}

/// Fetches one budget, subject to view access.
async fn get_budget(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<BudgetResponse>, ApiError> {
    let facts = actor.facts();
    let repo = BudgetRepository::new(state.db.clone());
    let model = repo
        .get(budget_id)
        .await?
        .ok_or_else(|| ApiError::from(BudgetError::NotFound(budget_id)))?;
    let department = budget_department(&model)?;
    if !authz::can_view_budget(&facts, department) {
        return Err(ApiError(AppError::Forbidden(
            "no access to this budget".to_string(),
        )));
    }
    Ok(Json(to_budget_response(model)))
}

/// Lists the requests drawing on a budget, subject to view access.
async fn list_budget_requests(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Vec<RequestResponse>>, ApiError> {
    let facts = actor.facts();
    let budget_repo = BudgetRepository::new(state.db.clone());
    let model = budget_repo
        .get(budget_id)
        .await?
        .ok_or_else(|| ApiError::from(BudgetError::NotFound(budget_id)))?;
    let department = budget_department(&model)?;
    if !authz::can_view_budget(&facts, department) {
        return Err(ApiError(AppError::Forbidden(
            "no access to this budget".to_string(),
        )));
    }

    let request_repo = RequestRepository::new(state.db.clone());
    let models = request_repo.list_for_budget(budget_id).await?;
    let responses = models
        .into_iter()
        .map(super::requests::to_request_response)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}

/// Rebuilds every budget's totals from the audit trail (admin only).
///
/// Rates are preloaded from the exchange_rates table; a missing rate
/// fails the whole run closed, leaving all totals untouched.
async fn recalculate_budgets(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let facts = actor.facts();
    if !facts.is_admin {
        return Err(ApiError(AppError::Forbidden(
            "admin role required".to_string(),
        )));
    }

    let rates = ExchangeRateRepository::new(state.db.clone())
        .list_to(Currency::reporting())
        .await?;
    let mut table = HashMap::new();
    for row in rates {
        if let Some(currency) = Currency::parse(&row.from_currency) {
            table.insert((currency, row.effective_date), row.rate);
        }
    }

    let repo = BudgetRepository::new(state.db.clone());
    let count = repo
        .recalculate(|currency, date| table.get(&(currency, date)).copied())
        .await?;
    info!(budgets = count, "budget totals recalculated");
    Ok(Json(serde_json::json!({ "recalculated": count })))
}
