//! Delivery state machine.
//!
//! # States (per session, i.e. per `pingId`)
//! ```text
//! Attempting → Delivered                       (reply body is exactly "OK")
//! Attempting → RetryScheduled → Attempting     (error reply, timeout, transport failure)
//! Attempting → Abandoned                       (interval just used > MAX_RETRY_TIME)
//! ```
//!
//! `Pinger::attempt` runs one attempt and returns the next state. Scheduling
//! the retry is left to the caller (see `dispatcher.rs`).

use std::sync::Arc;
use std::time::Duration;

use crate::delivery::record::PingRecord;
use crate::delivery::stats::ClientStats;
use crate::delivery::transport::Transport;
use crate::observability::metrics;
use crate::resilience::backoff::{BackoffPolicy, RetryDecision};
use crate::resilience::timeouts::with_deadline;

/// How a single attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Reply body was exactly `OK`.
    Delivered,
    /// A reply arrived but was not `OK`. Counted under `errors`.
    Rejected,
    /// No reply before the deadline. Counted under `timeouts`.
    TimedOut,
    /// Connection-level failure. Counted under `timeouts`.
    TransportFailed,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Delivered => "delivered",
            AttemptOutcome::Rejected => "rejected",
            AttemptOutcome::TimedOut => "timeout",
            AttemptOutcome::TransportFailed => "transport",
        }
    }
}

/// Where a session stands after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Delivered,
    /// Try `record` again after `retry_after` ms, carrying `retry_after` as
    /// the interval for the following decision.
    RetryScheduled { record: PingRecord, retry_after: u64 },
    Abandoned,
}

/// Delivers ping records to the collector, one attempt at a time.
pub struct Pinger<T> {
    transport: T,
    policy: BackoffPolicy,
    server_timeout: Duration,
    stats: Arc<ClientStats>,
}

impl<T: Transport> Pinger<T> {
    pub fn new(
        transport: T,
        policy: BackoffPolicy,
        server_timeout: Duration,
        stats: Arc<ClientStats>,
    ) -> Self {
        Self {
            transport,
            policy,
            server_timeout,
            stats,
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn stats(&self) -> &Arc<ClientStats> {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Make one delivery attempt for `record`.
    ///
    /// `retry_after` is the backoff interval this attempt was scheduled with
    /// (the policy's initial interval for a first attempt).
    pub async fn attempt(&self, record: &PingRecord, retry_after: u64) -> SessionState {
        self.stats.record_request();

        let result = with_deadline(self.server_timeout, self.transport.send(record)).await;
        let (outcome, response) = match result {
            Ok(Ok(reply)) if reply.is_accepted() => (AttemptOutcome::Delivered, reply.body),
            Ok(Ok(reply)) => (
                AttemptOutcome::Rejected,
                format!("{} {:?}", reply.status, reply.body),
            ),
            Ok(Err(e)) => (AttemptOutcome::TransportFailed, e.to_string()),
            Err(elapsed) => (AttemptOutcome::TimedOut, elapsed.to_string()),
        };

        self.stats.record_outcome(outcome);
        metrics::record_attempt(outcome.as_str());

        tracing::info!(
            ping_id = record.ping_id,
            attempt = record.delivery_attempt,
            transport = self.transport.name(),
            payload = %record,
            response = %response,
            outcome = outcome.as_str(),
            "Delivery attempt"
        );

        if outcome == AttemptOutcome::Delivered {
            metrics::record_session("delivered");
            return SessionState::Delivered;
        }

        match self.policy.decide(retry_after) {
            RetryDecision::GiveUp => {
                tracing::warn!(
                    ping_id = record.ping_id,
                    attempts = record.delivery_attempt,
                    last_interval_ms = retry_after,
                    "Ping delivery abandoned due to repeated collector failures"
                );
                metrics::record_session("abandoned");
                SessionState::Abandoned
            }
            RetryDecision::RetryAfter { delay_ms } => {
                tracing::debug!(
                    ping_id = record.ping_id,
                    next_attempt = record.delivery_attempt + 1,
                    delay_ms,
                    "Retry scheduled"
                );
                SessionState::RetryScheduled {
                    record: record.next_attempt(),
                    retry_after: delay_ms,
                }
            }
        }
    }
}
