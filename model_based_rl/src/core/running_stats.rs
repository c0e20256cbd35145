//! Running statistics using Welford's online algorithm.
//!
//! Accumulates per-dimension mean and variance in `f64`. Partial
//! accumulators combine with the parallel Welford formula, so statistics over
//! a dataset can be reduced trajectory by trajectory in any order.
//!
//! # Example
//! ```ignore
//! use model_based_rl::core::RunningMeanStd;
//!
//! let mut stats = RunningMeanStd::new(2);
//! stats.update(&[1.0, 2.0]);
//! stats.update(&[3.0, 4.0]);
//! assert_eq!(stats.mean(), &[2.0, 3.0]);
//! ```

use serde::{Deserialize, Serialize};

/// Running mean and variance per dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningMeanStd {
    /// Running mean per dimension
    mean: Vec<f64>,
    /// Sum of squared deviations per dimension (variance = var_sum / count)
    var_sum: Vec<f64>,
    /// Number of samples seen
    count: f64,
}

impl RunningMeanStd {
    /// Create a new accumulator for the given dimensionality.
    pub fn new(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            var_sum: vec![0.0; dim],
            count: 0.0,
        }
    }

    /// Update statistics with a single sample.
    ///
    /// # Panics
    /// Panics if the sample dimensionality doesn't match.
    pub fn update(&mut self, sample: &[f32]) {
        assert_eq!(sample.len(), self.mean.len(), "Sample dimension mismatch");

        self.count += 1.0;
        for (i, &x) in sample.iter().enumerate() {
            let x = x as f64;
            let delta = x - self.mean[i];
            self.mean[i] += delta / self.count;
            let delta2 = x - self.mean[i];
            self.var_sum[i] += delta * delta2;
        }
    }

    /// Update statistics with a flattened batch `[x1, x2, ...]` of `dim`-sized rows.
    pub fn update_batch(&mut self, batch: &[f32]) {
        let dim = self.mean.len();
        assert_eq!(batch.len() % dim, 0, "Batch size must be multiple of dimension");

        for sample in batch.chunks_exact(dim) {
            self.update(sample);
        }
    }

    /// Get the mean vector.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Population variance per dimension (zero before any sample).
    pub fn variance(&self) -> Vec<f64> {
        if self.count == 0.0 {
            vec![0.0; self.mean.len()]
        } else {
            self.var_sum.iter().map(|&v| v / self.count).collect()
        }
    }

    /// Population standard deviation per dimension, shifted up by `epsilon`.
    pub fn std_plus_epsilon(&self, epsilon: f64) -> Vec<f64> {
        self.variance()
            .into_iter()
            .map(|v| v.max(0.0).sqrt() + epsilon)
            .collect()
    }

    /// Get the sample count.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Get the dimensionality.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Merge statistics from another accumulator (parallel Welford).
    ///
    /// # Panics
    /// Panics if dimensionalities don't match.
    pub fn merge(&mut self, other: &RunningMeanStd) {
        assert_eq!(self.mean.len(), other.mean.len(), "Dimension mismatch in merge");

        if other.count == 0.0 {
            return;
        }
        if self.count == 0.0 {
            self.mean.copy_from_slice(&other.mean);
            self.var_sum.copy_from_slice(&other.var_sum);
            self.count = other.count;
            return;
        }

        let total_count = self.count + other.count;

        for i in 0..self.mean.len() {
            let delta = other.mean[i] - self.mean[i];
            // M2_combined = M2_a + M2_b + delta^2 * n_a * n_b / (n_a + n_b)
            self.var_sum[i] += other.var_sum[i] + delta * delta * self.count * other.count / total_count;
            self.mean[i] += delta * other.count / total_count;
        }

        self.count = total_count;
    }

    /// Merge a list of accumulators into one. `None` if the list is empty.
    pub fn merge_all(stats: &[RunningMeanStd]) -> Option<Self> {
        let (first, rest) = stats.split_first()?;
        let mut result = first.clone();
        for s in rest {
            result.merge(s);
        }
        Some(result)
    }
}
