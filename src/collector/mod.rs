//! Collector subsystem (ingestion side).
//!
//! # Data Flow
//! ```text
//! POST /data (http/server.rs)
//!     → outcome.rs (draw accept / reject / drop)
//!     → Accept: samples.rs (append responseTime)
//!
//! Shutdown:
//!     samples.rs (take, once) → aggregate.rs (mean, median) → stdout
//! ```

pub mod aggregate;
pub mod outcome;
pub mod samples;

pub use aggregate::{aggregate, Summary};
pub use outcome::{FailureInjector, Outcome, OutcomeBands};
pub use samples::SampleSet;
