//! Exponential backoff for delivery retries.

use std::time::Duration;

use crate::config::DeliveryConfig;

/// Backoff parameters for one delivery session.
///
/// The interval starts at `min_ms` and is multiplied by `exp` (rounded to
/// whole milliseconds) after every failed attempt. A session gives up once
/// the interval it *just used* is above `max_ms`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub min_ms: u64,
    pub max_ms: u64,
    pub exp: f64,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay_ms`, then try again carrying `delay_ms` as the new interval.
    RetryAfter { delay_ms: u64 },
    /// The ceiling was crossed; stop.
    GiveUp,
}

impl BackoffPolicy {
    pub fn new(min_ms: u64, max_ms: u64, exp: f64) -> Self {
        Self { min_ms, max_ms, exp }
    }

    /// The interval a fresh session starts with.
    pub fn initial(&self) -> u64 {
        self.min_ms
    }

    /// `round(current * exp)`, saturating at `u64::MAX`.
    pub fn next_interval(&self, current_ms: u64) -> u64 {
        let next = (current_ms as f64 * self.exp).round();
        if next >= u64::MAX as f64 {
            u64::MAX
        } else {
            next as u64
        }
    }

    /// Decide the follow-up for an attempt that used `used_ms` as its interval.
    ///
    /// The check is against the interval already used, not the upcoming one,
    /// so with defaults a session still schedules a 102400 ms wait before the
    /// final attempt.
    pub fn decide(&self, used_ms: u64) -> RetryDecision {
        // A saturated interval cannot grow any further.
        if used_ms > self.max_ms || used_ms == u64::MAX {
            RetryDecision::GiveUp
        } else {
            RetryDecision::RetryAfter {
                delay_ms: self.next_interval(used_ms),
            }
        }
    }

    /// Whether the first multiplication actually increases the interval.
    /// If it does, every later one does too.
    pub fn grows(&self) -> bool {
        self.next_interval(self.min_ms) > self.min_ms
    }

    /// Every interval a session carries when all of its attempts fail,
    /// starting with the initial one.
    pub fn schedule(&self) -> Vec<u64> {
        let mut intervals = vec![self.initial()];
        let mut current = self.initial();
        while let RetryDecision::RetryAfter { delay_ms } = self.decide(current) {
            intervals.push(delay_ms);
            current = delay_ms;
        }
        intervals
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&DeliveryConfig::default())
    }
}

impl From<&DeliveryConfig> for BackoffPolicy {
    fn from(config: &DeliveryConfig) -> Self {
        Self::new(config.min_retry_ms, config.max_retry_ms, config.retry_exp)
    }
}

/// Convenience for timers.
pub fn delay(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
