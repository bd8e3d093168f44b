//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and intervals > 0, status codes valid)
//! - Check that the probe target is an HTTP(S) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReachabilityConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the engine

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ReachabilityConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("reachability_url {url:?} is invalid: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("expected_response_status must not be empty")]
    NoExpectedStatus,

    #[error("expected_response_status contains {0}, which is not an HTTP status code")]
    InvalidStatus(u16),

    #[error("metrics_address {0:?} is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ReachabilityConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("timeout_ms", config.timeout_ms),
        ("interval_ms", config.interval_ms),
        ("background_interval_ms", config.background_interval_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroDuration { field });
        }
    }

    match Url::parse(&config.reachability_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            url: config.reachability_url.clone(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            url: config.reachability_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.expected_response_status.is_empty() {
        errors.push(ValidationError::NoExpectedStatus);
    }
    for &status in &config.expected_response_status {
        if !(100..=599).contains(&status) {
            errors.push(ValidationError::InvalidStatus(status));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
