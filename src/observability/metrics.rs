//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pinger_attempts_total` (counter): delivery attempts by outcome
//! - `pinger_sessions_total` (counter): finished sessions by result
//! - `pinger_probe_latency_ms` (histogram): measured target latency
//! - `pinger_probe_failures_total` (counter): ticks lost to probe errors
//! - `collector_requests_total` (counter): ingestion requests by drawn outcome
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt(outcome: &'static str) {
    counter!("pinger_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_session(result: &'static str) {
    counter!("pinger_sessions_total", "result" => result).increment(1);
}

pub fn record_probe(latency_ms: u64) {
    histogram!("pinger_probe_latency_ms").record(latency_ms as f64);
}

pub fn record_probe_failure() {
    counter!("pinger_probe_failures_total").increment(1);
}

pub fn record_collector_outcome(outcome: &'static str) {
    counter!("collector_requests_total", "outcome" => outcome).increment(1);
}
