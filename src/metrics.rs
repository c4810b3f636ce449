//! Completion-call latency samples and nearest-rank percentiles.

use serde::Serialize;

/// Percentiles reported in every snapshot, as fractions of the series.
pub const P50: f64 = 0.50;
pub const P90: f64 = 0.90;
pub const P99: f64 = 0.99;

/// Relative tolerance applied to `p * n` before taking the ceiling.
const RANK_EPSILON: f64 = 1e-12;

/// Statistics over the recorded latency series.
///
/// Every statistic is `None` when no sample has been recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PercentileSnapshot {
    pub count: usize,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
    pub avg_ms: Option<f64>,
    pub p50_ms: Option<f64>,
    pub p90_ms: Option<f64>,
    pub p99_ms: Option<f64>,
}

impl PercentileSnapshot {
    /// Compute statistics over `samples`, which need not be sorted.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let sum: f64 = sorted.iter().sum();
        Self {
            count: sorted.len(),
            min_ms: sorted.first().copied(),
            max_ms: sorted.last().copied(),
            avg_ms: Some(sum / sorted.len() as f64),
            p50_ms: nearest_rank(&sorted, P50),
            p90_ms: nearest_rank(&sorted, P90),
            p99_ms: nearest_rank(&sorted, P99),
        }
    }

    /// Check if the snapshot covers no samples.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Nearest-rank percentile of an ascending slice.
///
/// Selects the sample at index `ceil(p * n) - 1`, clamped to the slice.
/// Never interpolates. Returns `None` for an empty slice.
///
/// # Example
///
/// ```rust
/// use completion_foundation::metrics::nearest_rank;
///
/// let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
/// assert_eq!(nearest_rank(&sorted, 0.5), Some(30.0));
/// assert_eq!(nearest_rank(&sorted, 0.9), Some(50.0));
/// ```
pub fn nearest_rank(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let exact = p.clamp(0.0, 1.0) * n as f64;
    // Shave off representation error so 0.9 * 10 lands on rank 9, not 10.
    let rank = (exact - exact * RANK_EPSILON).ceil() as usize;
    let index = rank.saturating_sub(1).min(n - 1);
    Some(sorted[index])
}

/// Append-only series of completion-call latencies in milliseconds.
///
/// Samples are kept for the lifetime of the recorder; retention is the
/// host's concern.
#[derive(Debug, Clone, Default)]
pub struct LatencyRecorder {
    samples: Vec<f64>,
}

impl LatencyRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one measurement.
    ///
    /// Negative values are clamped to zero. Non-finite values are dropped and
    /// reported as `false`.
    pub fn record(&mut self, elapsed_ms: f64) -> bool {
        if !elapsed_ms.is_finite() {
            return false;
        }
        self.samples.push(elapsed_ms.max(0.0));
        true
    }

    /// Statistics over a sorted copy of the series.
    pub fn snapshot(&self) -> PercentileSnapshot {
        PercentileSnapshot::from_samples(&self.samples)
    }

    /// Get the number of recorded samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in recording order.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}
