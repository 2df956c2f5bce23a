//! Exchange rate routes.
//!
//! Read side resolves the rate a given date would convert at; the write
//! side lets the treasurer backfill daily closes when the feed is down.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};
use bursar_db::repositories::exchange_rate::{ExchangeRateRepository, UpsertRateInput};
use bursar_shared::AppError;
use bursar_shared::types::Currency;

/// Creates the rate routes (requires auth middleware to be applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rates/{currency}", get(get_rate))
        .route("/rates", put(upsert_rate))
}

/// Query parameters for a rate lookup.
#[derive(Debug, Deserialize)]
pub struct RateQuery {
    /// The date amounts are dated (defaults to today).
    pub date: Option<NaiveDate>,
}

/// Response for a rate lookup.
#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Source currency.
    pub currency: Currency,
    /// Reporting currency the rate converts into.
    pub reporting: Currency,
    /// 1 currency = rate reporting.
    pub rate: Decimal,
    /// The date the lookup was for.
    pub date: NaiveDate,
}

/// Request body for storing a daily close.
#[derive(Debug, Deserialize)]
pub struct UpsertRateBody {
    /// Source currency.
    pub currency: String,
    /// 1 currency = rate reporting-currency.
    pub rate: Decimal,
    /// Working day the rate closed on.
    pub effective_date: NaiveDate,
}

/// Resolves the rate amounts dated `date` would convert at.
async fn get_rate(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(currency): Path<String>,
    Query(query): Query<RateQuery>,
) -> Result<Json<RateResponse>, ApiError> {
    let currency = Currency::parse(&currency)
        .ok_or_else(|| ApiError(AppError::Validation(format!("unknown currency {currency:?}"))))?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let rate = state.rates.rate_on(currency, date).await?;
    Ok(Json(RateResponse {
        currency,
        reporting: Currency::reporting(),
        rate,
        date,
    }))
}

/// Stores a daily close (treasurer or admin).
async fn upsert_rate(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<UpsertRateBody>,
) -> Result<impl IntoResponse, ApiError> {
    let facts = actor.facts();
    if !facts.is_treasurer && !facts.is_admin {
        return Err(ApiError(AppError::Forbidden(
            "treasurer role required".to_string(),
        )));
    }
    let currency = Currency::parse(&body.currency).ok_or_else(|| {
        ApiError(AppError::Validation(format!(
            "unknown currency {:?}",
            body.currency
        )))
    })?;
    if body.rate <= Decimal::ZERO {
        return Err(ApiError(AppError::Validation(
            "rate must be positive".to_string(),
        )));
    }

    let repo = ExchangeRateRepository::new(state.db.clone());
    repo.upsert_rate(UpsertRateInput {
        from_currency: currency,
        to_currency: Currency::reporting(),
        rate: body.rate,
        effective_date: body.effective_date,
    })
    .await?;
    info!(%currency, date = %body.effective_date, "rate stored");
    Ok(StatusCode::NO_CONTENT)
}
