//! Configuration validation.
//!
//! Serde handles the syntactic side; this module runs semantic checks on a
//! parsed config and reports every problem it finds, not just the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration. Returns all errors found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "listener.request_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.fetch.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "fetch.timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if !(1..=100).contains(&config.transcode.default_quality) {
        errors.push(ValidationError {
            field: "transcode.default_quality",
            message: format!("must be in 1..=100, got {}", config.transcode.default_quality),
        });
    }

    if config.transcode.max_height == 0 {
        errors.push(ValidationError {
            field: "transcode.max_height",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
