//! Client-side delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::delivery::pinger::AttemptOutcome;

/// Attempt counters shared by every delivery session.
///
/// `requests` is bumped when an attempt starts, and exactly one of the
/// outcome counters when it finishes. Counters only ever grow.
#[derive(Debug, Default)]
pub struct ClientStats {
    success: AtomicU64,
    errors: AtomicU64,
    timeouts: AtomicU64,
    requests: AtomicU64,
}

impl ClientStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_outcome(&self, outcome: AttemptOutcome) {
        let counter = match outcome {
            AttemptOutcome::Delivered => &self.success,
            AttemptOutcome::Rejected => &self.errors,
            AttemptOutcome::TimedOut | AttemptOutcome::TransportFailed => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Point-in-time copy of the counters.
    ///
    /// Outcomes are read before `requests`, so a snapshot never shows more
    /// finished attempts than started ones.
    pub fn snapshot(&self) -> StatsSnapshot {
        let success = self.success.load(Ordering::SeqCst);
        let errors = self.errors.load(Ordering::SeqCst);
        let timeouts = self.timeouts.load(Ordering::SeqCst);
        let requests = self.requests.load(Ordering::SeqCst);
        StatsSnapshot {
            success,
            errors,
            timeouts,
            requests,
        }
    }
}

/// Serializable view of [`ClientStats`], printed at exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub success: u64,
    pub errors: u64,
    pub timeouts: u64,
    pub requests: u64,
}

impl StatsSnapshot {
    /// Attempts that have reached an outcome.
    pub fn settled(&self) -> u64 {
        self.success + self.errors + self.timeouts
    }

    /// Attempts started but not yet classified.
    pub fn in_flight(&self) -> u64 {
        self.requests.saturating_sub(self.settled())
    }
}
