//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so a broken file is reported in one pass.

use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration, returning every error found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "relay.bind_address", &config.relay.bind_address);
    check_addr(&mut errors, "content.bind_address", &config.content.bind_address);

    if config.relay.connect_timeout_secs == 0 {
        errors.push(ValidationError::new("relay.connect_timeout_secs", "must be greater than 0"));
    }
    if config.relay.response_timeout_secs == 0 {
        errors.push(ValidationError::new("relay.response_timeout_secs", "must be greater than 0"));
    }
    if config.content.request_timeout_secs == 0 {
        errors.push(ValidationError::new("content.request_timeout_secs", "must be greater than 0"));
    }

    if config.content.default_document.trim().is_empty() {
        errors.push(ValidationError::new("content.default_document", "must not be empty"));
    }

    let designated = &config.content.designated_document;
    if designated.trim().is_empty() {
        errors.push(ValidationError::new("content.designated_document", "must not be empty"));
    } else if designated.contains('/') || designated.contains('\\') {
        errors.push(ValidationError::new(
            "content.designated_document",
            "must be a file name, not a path",
        ));
    }

    if config.observability.metrics_enabled {
        check_addr(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError::new(field, format!("invalid socket address {value:?}: {e}")));
    }
}
