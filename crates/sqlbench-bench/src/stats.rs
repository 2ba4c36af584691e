//! Timing sample statistics

use serde::{Deserialize, Serialize};

/// Aggregate statistics over the per-run elapsed times of one benchmark
///
/// Times are wall-clock milliseconds. `minimum <= average <= maximum`
/// holds whenever `number_of_sample > 0`; all fields are zero for an
/// empty sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStats {
    /// Count of successful runs
    pub number_of_sample: u64,
    /// Sum of per-run elapsed milliseconds
    pub total_sample_time: f64,
    pub minimum_sample_time: f64,
    pub maximum_sample_time: f64,
    pub average_sample_time: f64,
}

impl SampleStats {
    /// The all-zero statistics of an empty sample set
    pub fn zero() -> Self {
        Self {
            number_of_sample: 0,
            total_sample_time: 0.0,
            minimum_sample_time: 0.0,
            maximum_sample_time: 0.0,
            average_sample_time: 0.0,
        }
    }

    /// Reduce a set of per-run elapsed times (in milliseconds)
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::zero();
        }

        let total: f64 = samples.iter().sum();
        let minimum = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let maximum = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            number_of_sample: samples.len() as u64,
            total_sample_time: total,
            minimum_sample_time: minimum,
            maximum_sample_time: maximum,
            average_sample_time: total / samples.len() as f64,
        }
    }

    /// Humanized total time for display (e.g. "12 ms", "1.25 s")
    pub fn pretty_total(&self) -> String {
        let ms = self.total_sample_time;
        if ms < 10.0 {
            format!("{:.2} ms", ms)
        } else if ms < 1_000.0 {
            format!("{:.0} ms", ms)
        } else if ms < 60_000.0 {
            format!("{:.2} s", ms / 1_000.0)
        } else {
            format!("{:.1} min", ms / 60_000.0)
        }
    }
}
