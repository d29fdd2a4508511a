//! Synthetic uptime-probing harness.
//!
//! The pinger measures latency to a target and reports each measurement to
//! the collector, retrying with exponential backoff. The collector randomly
//! accepts, rejects or drops reports and summarizes accepted latencies at
//! shutdown.

pub mod collector;
pub mod config;
pub mod delivery;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod resilience;

pub use config::schema::HarnessConfig;
pub use http::CollectorServer;
pub use lifecycle::Shutdown;
