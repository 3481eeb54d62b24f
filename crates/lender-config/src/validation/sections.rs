use crate::schema::{LenderConfig, LOG_LEVELS};

use super::helpers::{validate_one_of, validate_range};

pub(crate) fn validate_service(errors: &mut Vec<String>, config: &LenderConfig) {
    let url = config.service.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "service.base_url = '{url}' must start with http:// or https://"
        ));
    }
    validate_range(
        errors,
        "service.connect_timeout_secs",
        config.service.connect_timeout_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "service.request_timeout_secs",
        config.service.request_timeout_secs,
        1,
        600,
    );
}

pub(crate) fn validate_summary(errors: &mut Vec<String>, config: &LenderConfig) {
    validate_range(
        errors,
        "summary.settle_delay_ms",
        config.summary.settle_delay_ms,
        0,
        5000,
    );
}

pub(crate) fn validate_session(errors: &mut Vec<String>, config: &LenderConfig) {
    validate_range(
        errors,
        "session.event_capacity",
        config.session.event_capacity,
        8,
        4096,
    );
}

pub(crate) fn validate_logging(errors: &mut Vec<String>, config: &LenderConfig) {
    validate_one_of(errors, "logging.level", &config.logging.level, LOG_LEVELS);
}
