//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the harness.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration shared by the pinger client and the collector.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Latency probe settings (scheduler side).
    pub probe: ProbeConfig,

    /// Delivery and retry settings (pinger side).
    pub delivery: DeliveryConfig,

    /// Ingestion endpoint settings (collector side).
    pub collector: CollectorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Probe scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Period between probes in milliseconds (`PING_INTERVAL`).
    pub interval_ms: u64,

    /// URL whose latency is measured (`CHECK_URL`).
    pub check_url: String,

    /// Upper bound for a single measurement. Falls back to the delivery
    /// timeout when unset.
    pub timeout_ms: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            check_url: "https://fundraiseup.com/".to_string(),
            timeout_ms: None,
        }
    }
}

/// Delivery configuration for the pinger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Full URL of the collector's ingestion route.
    pub collector_url: String,

    /// Per-attempt deadline in milliseconds (`SERVER_TIMEOUT`).
    pub server_timeout_ms: u64,

    /// First backoff interval in milliseconds (`MIN_RETRY_TIME`).
    pub min_retry_ms: u64,

    /// Backoff ceiling in milliseconds (`MAX_RETRY_TIME`).
    pub max_retry_ms: u64,

    /// Backoff multiplier (`RETRY_EXP`).
    pub retry_exp: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://127.0.0.1:8080/data".to_string(),
            server_timeout_ms: 10_000,
            min_retry_ms: 100,
            max_retry_ms: 60_000,
            retry_exp: 2.0,
        }
    }
}

impl DeliveryConfig {
    pub fn server_timeout(&self) -> Duration {
        Duration::from_millis(self.server_timeout_ms)
    }
}

/// How the collector picks the median of an odd-length sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MedianMode {
    /// Index `ceil(n / 2)`, one right of the middle element.
    #[default]
    Reference,
    /// Index `n / 2`, the true middle element.
    Exact,
}

/// Collector configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Share of requests (out of 100) that get no response at all.
    pub drop_percent: u32,

    /// Share of requests (out of 100) answered with an error status.
    pub reject_percent: u32,

    /// Median selection for odd-length sample sets.
    pub median: MedianMode,

    /// Fixed RNG seed. Outcomes are drawn from OS entropy when unset.
    pub seed: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            drop_percent: 20,
            reject_percent: 20,
            median: MedianMode::Reference,
            seed: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
