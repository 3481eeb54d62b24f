//! Lender assistant configuration.
//!
//! TOML-based configuration with validation. Every section uses serde
//! defaults so partial configs work out of the box.
//!
//! ```rust,no_run
//! let config = lender_config::load_config(None).expect("failed to load config");
//! println!("{}", config.service.base_url);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    LenderConfig, LoggingConfig, ServiceConfig, SessionConfig, SummaryConfig,
    CONFIG_SCHEMA_VERSION,
};

use lender_common::ConfigError;
use std::path::Path;

/// Environment variable that replaces `service.base_url`.
pub const BASE_URL_ENV: &str = "LENDER_BASE_URL";

/// Load config from `path`, or from the platform default location when
/// `None`, then apply environment overrides and validate.
pub fn load_config(path: Option<&Path>) -> Result<LenderConfig, ConfigError> {
    let mut config = match path {
        Some(p) => toml_loader::load_from_path(p)?,
        None => toml_loader::load_default()?,
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    validation::validate(&config)?;
    Ok(config)
}

/// Apply environment overrides through `lookup` (normally `std::env::var`).
pub fn apply_overrides(config: &mut LenderConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
        tracing::debug!("service.base_url overridden by {BASE_URL_ENV}");
        config.service.base_url = url.trim().trim_end_matches('/').to_string();
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &LenderConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
