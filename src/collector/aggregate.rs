//! Shutdown-time reduction of latency samples.

use std::fmt;

use serde::Serialize;

use crate::config::MedianMode;

/// Final statistics for a collector run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    NoData,
    Stats { count: usize, mean: f64, median: f64 },
}

/// Reduce `samples` to mean and median. No arithmetic happens when empty.
pub fn aggregate(mut samples: Vec<f64>, mode: MedianMode) -> Summary {
    if samples.is_empty() {
        return Summary::NoData;
    }

    samples.sort_by(f64::total_cmp);
    let count = samples.len();
    let mean = samples.iter().sum::<f64>() / count as f64;

    let median = if count % 2 == 0 {
        let upper = count / 2;
        (samples[upper - 1] + samples[upper]) / 2.0
    } else {
        let index = match mode {
            // ceil(n / 2) lands one right of the middle; a single sample has no right neighbour.
            MedianMode::Reference => count.div_ceil(2).min(count - 1),
            MedianMode::Exact => count / 2,
        };
        samples[index]
    };

    Summary::Stats {
        count,
        mean,
        median,
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Summary::NoData => write!(f, "No time data"),
            Summary::Stats { mean, median, .. } => {
                write!(f, "Mean: {}\nMedian: {}", mean, median)
            }
        }
    }
}
