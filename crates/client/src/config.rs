//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FRESH_BASKET_API_BASE_URL` - Backend REST API root
//!   (e.g. `https://api.freshbasket.example/api`)
//!
//! ## Optional
//! - `FRESH_BASKET_TIMEOUT_SECS` - Bounded request timeout (default: 20)
//! - `FRESH_BASKET_SESSION_FILE` - Path for the persisted session
//!   (default: `$XDG_STATE_HOME/fresh-basket/session.json`, falling back to
//!   `~/.local/state/fresh-basket/session.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default bounded request timeout, matching the mobile client's 20s window.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Fresh Basket client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend REST API root, without a trailing slash.
    pub api_base_url: Url,
    /// Bounded timeout applied to every request.
    pub request_timeout: Duration,
    /// Where the session token and user object are persisted.
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_base = get_required_env("FRESH_BASKET_API_BASE_URL")?;
        let api_base_url = Url::parse(raw_base.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("FRESH_BASKET_API_BASE_URL".to_owned(), e.to_string())
        })?;

        let timeout_secs = match get_optional_env("FRESH_BASKET_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("FRESH_BASKET_TIMEOUT_SECS".to_owned(), e.to_string())
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let session_file = get_optional_env("FRESH_BASKET_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            session_file,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Build a config directly, for tests and embedded use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid URL.
    pub fn for_base_url(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = Url::parse(api_base_url.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("api_base_url".to_owned(), e.to_string())
        })?;
        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: default_session_file(),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Default session file location under the user's state directory.
fn default_session_file() -> PathBuf {
    let state_dir = std::env::var_os("XDG_STATE_HOME").map_or_else(
        || {
            let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
            home.join(".local").join("state")
        },
        PathBuf::from,
    );
    state_dir.join("fresh-basket").join("session.json")
}
