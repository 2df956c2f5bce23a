//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Exchange-rate provider configuration.
    #[serde(default)]
    pub fx: FxConfig,
    /// Notifier configuration.
    #[serde(default)]
    pub notifier: NotifierConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key shared with the identity provider.
    pub secret: String,
}

/// Exchange-rate provider configuration.
///
/// Rates are served from the database; when a date is missing and a
/// `provider_url` is configured, the daily series is fetched once and
/// persisted. With no provider configured, missing rates fail closed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FxConfig {
    /// Daily-rate feed endpoint (optional).
    pub provider_url: Option<String>,
    /// API key for the rate feed.
    pub api_key: Option<String>,
}

/// Notifier configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifierConfig {
    /// Webhook URL that receives domain events after each committed
    /// transition (optional; events are logged when unset).
    pub webhook_url: Option<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BURSAR").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
