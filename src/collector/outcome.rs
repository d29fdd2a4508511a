//! Stochastic failure injection.
//!
//! Each ingestion request draws `v` uniformly from `[0, 100)`:
//!
//! ```text
//! [0, drop)            → Drop    (no response)
//! [drop, drop+reject)  → Reject  (error status, empty body)
//! [drop+reject, 100)   → Accept  ("OK")
//! ```
//!
//! With the default 20/20 split that is 20% drop, 20% reject, 60% accept.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::CollectorConfig;

/// What the collector does with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accept,
    Reject,
    Drop,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Accept => "accept",
            Outcome::Reject => "reject",
            Outcome::Drop => "drop",
        }
    }
}

/// Partition of `[0, 100)` into outcome bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeBands {
    drop_upper: u32,
    reject_upper: u32,
}

impl OutcomeBands {
    /// Shares are clamped so the two failure bands never exceed 100.
    pub fn new(drop_percent: u32, reject_percent: u32) -> Self {
        let drop_upper = drop_percent.min(100);
        let reject_upper = drop_upper.saturating_add(reject_percent).min(100);
        Self {
            drop_upper,
            reject_upper,
        }
    }

    pub fn classify(&self, v: u32) -> Outcome {
        if v >= self.reject_upper {
            Outcome::Accept
        } else if v >= self.drop_upper {
            Outcome::Reject
        } else {
            Outcome::Drop
        }
    }
}

impl Default for OutcomeBands {
    fn default() -> Self {
        Self::new(20, 20)
    }
}

/// Draws outcomes from a shared RNG.
pub struct FailureInjector {
    bands: OutcomeBands,
    rng: Mutex<StdRng>,
}

impl FailureInjector {
    pub fn new(bands: OutcomeBands, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            bands,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> Self {
        Self::new(
            OutcomeBands::new(config.drop_percent, config.reject_percent),
            config.seed,
        )
    }

    pub fn draw(&self) -> Outcome {
        let v = self
            .rng
            .lock()
            .expect("failure injector rng mutex poisoned")
            .gen_range(0..100);
        self.bands.classify(v)
    }
}
