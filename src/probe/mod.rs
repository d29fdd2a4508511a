//! Probe subsystem (pinger side).
//!
//! # Data Flow
//! ```text
//! Periodic timer (scheduler.rs)
//!     → target.rs (GET CHECK_URL, bounded by the probe timeout)
//!     → elapsed time → PingRecord { deliveryAttempt: 1 }
//!     → delivery queue
//! ```
//!
//! # Design Decisions
//! - One task per tick; the timer never waits on a probe
//! - A failed probe consumes its ping id but produces no record

pub mod scheduler;
pub mod target;

pub use scheduler::Scheduler;
pub use target::{HttpProbe, LatencyProbe, ProbeError};
