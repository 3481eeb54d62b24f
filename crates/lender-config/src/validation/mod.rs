//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator calls them all and
//! collects errors into a single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::LenderConfig;
use lender_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LenderConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_service(&mut errors, config);
    sections::validate_summary(&mut errors, config);
    sections::validate_session(&mut errors, config);
    sections::validate_logging(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
