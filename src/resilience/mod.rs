//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Delivery attempt:
//!     → timeouts.rs (enforce SERVER_TIMEOUT on the call)
//!     → On failure: backoff.rs (next interval, or give up past the ceiling)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Backoff is a pure policy; scheduling the retry is the dispatcher's job
//! - No jitter: retry timing must be reproducible

pub mod backoff;
pub mod timeouts;

pub use backoff::{BackoffPolicy, RetryDecision};
pub use timeouts::{with_deadline, Elapsed};
