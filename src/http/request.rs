//! Request inspection for the ingestion route.
//!
//! # Responsibilities
//! - Read the request ID set by the middleware stack
//! - Pull `responseTime` out of a ping payload
//!
//! # Design Decisions
//! - Payloads are parsed leniently: a bad body never fails the request,
//!   it only means no sample is recorded
//! - `responseTime` may be a JSON number or a numeric string

use axum::http::HeaderMap;
use serde_json::Value;

pub const X_REQUEST_ID: &str = "x-request-id";

/// The request ID header, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// `responseTime` from a JSON ping payload, when present and numeric.
pub fn response_time(body: &[u8]) -> Option<f64> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    let value = match payload.get("responseTime")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
