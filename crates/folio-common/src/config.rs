//! Client configuration loaded from environment variables and config files.
//!
//! Config precedence: env vars > .env file > folio.toml > defaults

use serde::Deserialize;
use std::path::Path;

/// Load `.env` if present, then build the configuration.
///
/// Call once at startup; `file` replaces the default `folio.toml` lookup.
pub fn init(file: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    load_from(file)
}

/// Build a configuration without reading `.env`.
pub fn load() -> Result<AppConfig, config::ConfigError> {
    load_from(None)
}

/// Build a configuration, reading `file` instead of the default `folio.toml`.
pub fn load_from(file: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let builder = config::Config::builder()
        .set_default("api.base_url", "http://localhost:8080")?
        .set_default("api.timeout_secs", 30)?
        .set_default("api.user_agent", concat!("folio/", env!("CARGO_PKG_VERSION")))?
        .set_default("storage.path", "./.folio/session.json")?
        .set_default("log.filter", "folio=info")?;

    let builder = match file {
        Some(path) => builder.add_source(config::File::from(path).required(true)),
        None => builder.add_source(config::File::with_name("folio").required(false)),
    };

    let cfg = builder
        // Environment variables (FOLIO_API__BASE_URL, FOLIO_STORAGE__PATH, etc.)
        .add_source(
            config::Environment::with_prefix("FOLIO")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    cfg.try_deserialize()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the portfolio API, without the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// JSON file holding tokens, the session user and the login time.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}
