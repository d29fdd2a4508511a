//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! Validation is a pure function returning every error it finds, not just
//! the first one.

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::HarnessConfig;
use crate::resilience::backoff::BackoffPolicy;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("delivery.retry_exp must be a finite number greater than 1 (got {0})")]
    RetryExponent(f64),

    #[error("delivery.retry_exp {exp} does not grow an interval of {min_ms} ms")]
    StalledBackoff { min_ms: u64, exp: f64 },

    #[error("{field} is not a valid http(s) URL: {value}")]
    Url { field: &'static str, value: String },

    #[error("{field} is not a valid socket address: {value}")]
    Address { field: &'static str, value: String },

    #[error("collector.drop_percent + collector.reject_percent must not exceed 100 (got {0})")]
    OutcomeShares(u32),
}

/// Check a configuration before it is handed to any subsystem.
pub fn validate_config(config: &HarnessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let positive = [
        ("probe.interval_ms", config.probe.interval_ms),
        ("delivery.server_timeout_ms", config.delivery.server_timeout_ms),
        ("delivery.min_retry_ms", config.delivery.min_retry_ms),
        ("delivery.max_retry_ms", config.delivery.max_retry_ms),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    if config.probe.timeout_ms == Some(0) {
        errors.push(ValidationError::Zero { field: "probe.timeout_ms" });
    }

    // An exponent of 1 or less never crosses the ceiling, so sessions would retry forever.
    let exp = config.delivery.retry_exp;
    if !exp.is_finite() || exp <= 1.0 {
        errors.push(ValidationError::RetryExponent(exp));
    } else if config.delivery.min_retry_ms > 0
        && !BackoffPolicy::from(&config.delivery).grows()
    {
        errors.push(ValidationError::StalledBackoff {
            min_ms: config.delivery.min_retry_ms,
            exp,
        });
    }

    check_url(&mut errors, "probe.check_url", &config.probe.check_url);
    check_url(&mut errors, "delivery.collector_url", &config.delivery.collector_url);

    check_addr(&mut errors, "collector.bind_address", &config.collector.bind_address);
    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let shares = config
        .collector
        .drop_percent
        .saturating_add(config.collector.reject_percent);
    if shares > 100 {
        errors.push(ValidationError::OutcomeShares(shares));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::Url {
            field,
            value: value.to_string(),
        });
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}
