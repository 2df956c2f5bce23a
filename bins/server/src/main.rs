//! Bursar API Server
//!
//! Main entry point for the Bursar treasury backend.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bursar_api::{AppState, Notifier, RateService, create_router};
use bursar_db::connect;
use bursar_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bursar=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("configuration: {e}"))?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // JWT validation for identity-provider tokens
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        ..JwtConfig::default()
    });

    // Exchange-rate resolution and post-commit event forwarding
    let rates = RateService::new(db.clone(), config.fx.clone());
    let notifier = Notifier::new(config.notifier.clone());
    if let Some(url) = &config.notifier.webhook_url {
        info!(webhook = %url, "Notifier configured");
    }

    // Create application state
    let state = AppState {
        db,
        jwt_service: Arc::new(jwt_service),
        rates: Arc::new(rates),
        notifier: Arc::new(notifier),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
