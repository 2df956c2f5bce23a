//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware (bearer tokens from the identity provider)
//! - Exchange-rate resolution for ledger conversions
//! - Post-commit domain event emission

pub mod error;
pub mod fx;
pub mod middleware;
pub mod notify;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bursar_shared::JwtService;

pub use fx::RateService;
pub use notify::Notifier;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// JWT service validating identity-provider tokens.
    pub jwt_service: Arc<JwtService>,
    /// Exchange-rate resolution (cache → table → feed).
    pub rates: Arc<RateService>,
    /// Post-commit domain event emission.
    pub notifier: Arc<Notifier>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
