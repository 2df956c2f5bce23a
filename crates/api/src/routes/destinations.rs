//! Destination routes: saved payee profiles.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};
use bursar_core::destination::{PaymentDetails, Platform};
use bursar_db::entities::destinations;
use bursar_db::repositories::destination::{CreateDestinationInput, DestinationRepository};
use bursar_shared::AppError;

/// Creates the destination routes (requires auth middleware to be
/// applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/destinations", get(list_destinations))
        .route("/destinations", post(create_destination))
        .route("/destinations/mine", get(list_own_destinations))
        .route("/destinations/{destination_id}", get(get_destination))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for saving a payee profile.
#[derive(Debug, Deserialize)]
pub struct CreateDestinationBody {
    /// Payee name.
    pub name: String,
    /// "bank" or "card".
    pub platform: String,
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
    /// Visible to every member.
    pub public: Option<bool>,
    /// Pinned in the owner's payee list.
    pub star: Option<bool>,
}

/// Response for a destination.
#[derive(Debug, Serialize)]
pub struct DestinationResponse {
    /// Destination id.
    pub id: Uuid,
    /// Owning actor.
    pub owner_id: Uuid,
    /// Payee name.
    pub name: String,
    /// Payment platform.
    pub platform: String,
    /// Sort code (bank).
    pub sort_code: Option<String>,
    /// Account number (bank).
    pub account_number: Option<String>,
    /// Business account flag.
    pub business: bool,
    /// Card number (card).
    pub card_number: Option<String>,
    /// Issuing bank (card).
    pub bank_name: Option<String>,
    /// Publicly visible.
    pub public: bool,
    /// Pinned.
    pub star: bool,
}

fn to_response(model: destinations::Model) -> DestinationResponse {
    DestinationResponse {
        id: model.id,
        owner_id: model.owner_id,
        name: model.name,
        platform: model.platform,
        sort_code: model.sort_code,
        account_number: model.account_number,
        business: model.business,
        card_number: model.card_number,
        bank_name: model.bank_name,
        public: model.public,
        star: model.star,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Lists all public destinations.
async fn list_destinations(
    State(state): State<AppState>,
    _actor: AuthUser,
) -> Result<Json<Vec<DestinationResponse>>, ApiError> {
    let repo = DestinationRepository::new(state.db.clone());
    let models = repo.list_public().await?;
    Ok(Json(models.into_iter().map(to_response).collect()))
}

/// Lists the actor's own destinations, starred first.
async fn list_own_destinations(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<Json<Vec<DestinationResponse>>, ApiError> {
    let repo = DestinationRepository::new(state.db.clone());
    let models = repo.list_for_owner(actor.actor_id()).await?;
    Ok(Json(models.into_iter().map(to_response).collect()))
}

/// Saves a payee profile after validating it against its platform.
async fn create_destination(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(body): Json<CreateDestinationBody>,
) -> Result<impl IntoResponse, ApiError> {
    let platform = Platform::parse(&body.platform).ok_or_else(|| {
        ApiError(AppError::Validation(format!(
            "unknown platform {:?}",
            body.platform
        )))
    })?;
    let details = PaymentDetails {
        name: body.name,
        platform: Some(platform),
        sort_code: body.sort_code,
        account_number: body.account_number,
        business: body.business.unwrap_or(false),
        card_number: body.card_number,
        bank_name: body.bank_name,
    };
    details.validate()?;

    let repo = DestinationRepository::new(state.db.clone());
    let model = repo
        .create(CreateDestinationInput {
            owner_id: actor.actor_id(),
            details,
            public: body.public.unwrap_or(false),
            star: body.star.unwrap_or(false),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(to_response(model))))
}

/// Fetches one destination; private profiles are owner-only.
async fn get_destination(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(destination_id): Path<Uuid>,
) -> Result<Json<DestinationResponse>, ApiError> {
    let repo = DestinationRepository::new(state.db.clone());
    let model = repo
        .get(destination_id)
        .await?
        .ok_or_else(|| ApiError(AppError::NotFound(format!("destination {destination_id}"))))?;
    if !model.public && model.owner_id != actor.actor_id() {
        return Err(ApiError(AppError::Forbidden(
            "no access to this destination".to_string(),
        )));
    }
    Ok(Json(to_response(model)))
}
