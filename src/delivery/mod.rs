//! Delivery subsystem (pinger side).
//!
//! # Data Flow
//! ```text
//! Scheduler tick
//!     → dispatcher.rs (queue item due now, attempt 1)
//!     → pinger.rs (one attempt: send, classify, count)
//!         → transport.rs (POST /data, bounded by SERVER_TIMEOUT)
//!     → RetryScheduled: back into dispatcher.rs after the backoff delay
//!     → Delivered / Abandoned: session ends
//! ```
//!
//! # Design Decisions
//! - Sessions share nothing but `ClientStats` (atomic counters)
//! - A retry is a new `PingRecord` value, never a mutation
//! - Success means a reply body of exactly `OK`; everything else is retried

pub mod dispatcher;
pub mod pinger;
pub mod record;
pub mod stats;
pub mod transport;

pub use dispatcher::{DeliveryQueue, Dispatcher, RetryItem};
pub use pinger::{AttemptOutcome, Pinger, SessionState};
pub use record::PingRecord;
pub use stats::{ClientStats, StatsSnapshot};
pub use transport::{CollectorReply, DeliveryError, HttpTransport, Transport};
