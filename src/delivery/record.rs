//! The measurement record sent to the collector.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One latency measurement, tagged with its session and attempt.
///
/// Serialized as `{"pingId":..,"deliveryAttempt":..,"date":..,"responseTime":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRecord {
    /// Scheduler tick this measurement belongs to.
    pub ping_id: u64,
    /// 1-based delivery attempt within the session.
    pub delivery_attempt: u32,
    /// Measurement start, epoch milliseconds.
    pub date: i64,
    /// Measured latency in milliseconds.
    pub response_time: u64,
}

impl PingRecord {
    /// A fresh record for the first delivery attempt.
    pub fn new(ping_id: u64, date: i64, response_time: u64) -> Self {
        Self {
            ping_id,
            delivery_attempt: 1,
            date,
            response_time,
        }
    }

    /// The same measurement, tagged for the following attempt.
    pub fn next_attempt(&self) -> Self {
        Self {
            delivery_attempt: self.delivery_attempt.saturating_add(1),
            ..*self
        }
    }
}

impl fmt::Display for PingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Current wall clock time in epoch milliseconds.
pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
