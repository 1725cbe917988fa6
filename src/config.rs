use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_at_least_64_characters_long_for_testing";

/// Regional formatting rules. The original deployment targets the Indian
/// market; every regional constant is configurable rather than hardcoded.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegionalConfig {
    /// Country calling code prepended during phone normalization (digits only)
    #[serde(default = "default_country_code")]
    pub country_code: String,

    /// Currency symbol printed on bills
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Locale tag controlling calendar-date rendering on bills
    #[serde(default = "default_date_locale")]
    pub date_locale: String,
}

impl Default for RegionalConfig {
    fn default() -> Self {
        Self {
            country_code: default_country_code(),
            currency_symbol: default_currency_symbol(),
            date_locale: default_date_locale(),
        }
    }
}

fn default_country_code() -> String {
    "91".to_string()
}

fn default_currency_symbol() -> String {
    "\u{20B9}".to_string()
}

fn default_date_locale() -> String {
    "en-IN".to_string()
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key (minimum 64 characters)
    #[validate(length(min = 64))]
    pub jwt_secret: String,

    /// JWT expiration time in seconds
    pub jwt_expiration: usize,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Externally reachable base URL, used for bill artifact URLs and
    /// tracking share links (e.g. "https://shop.example.com")
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Filesystem root of the generated-document store
    #[serde(default = "default_storage_root")]
    pub storage_root: String,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Public tracking lookup: requests per window per client
    #[serde(default = "default_tracking_rate_limit")]
    pub tracking_requests_per_window: u32,

    /// Public tracking lookup: window size (seconds)
    #[serde(default = "default_rate_limit_window_secs")]
    pub tracking_window_seconds: u64,

    /// Registration: attempts allowed before the cooldown kicks in
    #[serde(default = "default_registration_rate_limit")]
    pub registration_requests_per_window: u32,

    /// Registration: cooldown window (seconds)
    #[serde(default = "default_registration_cooldown_secs")]
    pub registration_cooldown_seconds: u64,

    /// Regional formatting rules
    #[serde(default)]
    pub regional: RegionalConfig,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_public_base_url() -> String {
    format!("http://localhost:{}", DEFAULT_PORT)
}

fn default_storage_root() -> String {
    "data/files".to_string()
}

fn default_tracking_rate_limit() -> u32 {
    30
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_registration_rate_limit() -> u32 {
    3
}

fn default_registration_cooldown_secs() -> u64 {
    300
}

impl AppConfig {
    /// Minimal constructor used by tests and embedded setups.
    pub fn new(
        database_url: impl Into<String>,
        jwt_secret: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration: 3600,
            host: host.into(),
            port,
            environment: environment.into(),
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            public_base_url: format!("http://localhost:{port}"),
            storage_root: default_storage_root(),
            cors_allowed_origins: None,
            tracking_requests_per_window: default_tracking_rate_limit(),
            tracking_window_seconds: default_rate_limit_window_secs(),
            registration_requests_per_window: default_registration_rate_limit(),
            registration_cooldown_seconds: default_registration_cooldown_secs(),
            regional: RegionalConfig::default(),
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "test"
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),
    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Loads configuration from `config/` files and `APP__`-prefixed environment
/// variables, layered in that order.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://tailorbook.db?mode=rwc")?
        .set_default("jwt_expiration", 3600)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    let mut config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // jwt_secret has no production default; the development profile falls
    // back to a fixed value so local runs work out of the box.
    if config.get_string("jwt_secret").is_err() {
        if run_env == DEFAULT_ENV || run_env == "test" {
            config = Config::builder()
                .add_source(config)
                .set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?
                .build()?;
        } else {
            error!("JWT secret is not configured. Set APP__JWT_SECRET with a secure random string (minimum 64 characters).");
            return Err(AppConfigError::Load(ConfigError::NotFound(
                "jwt_secret is required but not configured. Set APP__JWT_SECRET environment variable.".into(),
            )));
        }
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    Ok(app_config)
}

/// Initializes the global tracing subscriber.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("tailorbook_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_defaults_target_indian_market() {
        let regional = RegionalConfig::default();
        assert_eq!(regional.country_code, "91");
        assert_eq!(regional.currency_symbol, "\u{20B9}");
        assert_eq!(regional.date_locale, "en-IN");
    }

    #[test]
    fn minimal_constructor_produces_valid_config() {
        let cfg = AppConfig::new(
            "sqlite::memory:",
            DEV_DEFAULT_JWT_SECRET,
            "127.0.0.1",
            18080,
            "test",
        );
        assert!(cfg.validate().is_ok());
        assert!(cfg.is_development());
        assert_eq!(cfg.public_base_url, "http://localhost:18080");
    }
}
