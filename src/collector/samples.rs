//! Accepted latency samples.

use std::sync::Mutex;

/// Append-only sample store, consumed exactly once at shutdown.
#[derive(Debug)]
pub struct SampleSet {
    samples: Mutex<Option<Vec<f64>>>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self {
            samples: Mutex::new(Some(Vec::new())),
        }
    }

    /// Append a sample. Non-finite values and appends after [`take`](Self::take)
    /// are refused.
    pub fn record(&self, latency_ms: f64) -> bool {
        if !latency_ms.is_finite() {
            return false;
        }
        let mut guard = self.samples.lock().expect("sample set mutex poisoned");
        match guard.as_mut() {
            Some(samples) => {
                samples.push(latency_ms);
                true
            }
            None => {
                tracing::warn!(latency_ms, "Sample arrived after aggregation, ignored");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .expect("sample set mutex poisoned")
            .as_ref()
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hand over every sample. `None` if already taken.
    pub fn take(&self) -> Option<Vec<f64>> {
        self.samples.lock().expect("sample set mutex poisoned").take()
    }
}

impl Default for SampleSet {
    fn default() -> Self {
        Self::new()
    }
}
