//! DAgger-style dataset aggregation.
//!
//! After each iteration the dataset becomes the fresh on-policy trajectories
//! plus a subsample of the previous dataset:
//!
//! ```text
//! keep    = floor(len(old) * retention_ratio)      (capped by max_trajectories)
//! dataset = new ∪ strategy.select(old, keep)
//! ```
//!
//! With the default ratio of 1/9 the dataset stays bounded near
//! `num_new * 9 / 8` trajectories instead of growing without limit.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use super::dataset::Dataset;
use crate::core::error::{MbrlError, Result};
use crate::core::transition::Trajectory;

/// Default share of the old dataset kept on each aggregation.
pub const DEFAULT_RETENTION_RATIO: f64 = 1.0 / 9.0;

/// Chooses which old trajectories survive aggregation.
pub trait RetentionStrategy {
    /// Return exactly `min(keep, old.len())` trajectories taken from `old`.
    fn select(&mut self, old: Vec<Trajectory>, keep: usize) -> Vec<Trajectory>;
}

/// Uniform sampling without replacement, seeded.
#[derive(Debug, Clone)]
pub struct UniformSubsample {
    rng: StdRng,
}

impl UniformSubsample {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RetentionStrategy for UniformSubsample {
    fn select(&mut self, old: Vec<Trajectory>, keep: usize) -> Vec<Trajectory> {
        let keep = keep.min(old.len());
        let picked = index::sample(&mut self.rng, old.len(), keep);
        let mut slots: Vec<Option<Trajectory>> = old.into_iter().map(Some).collect();
        picked.iter().filter_map(|i| slots[i].take()).collect()
    }
}

/// Discards the whole old dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetainNone;

impl RetentionStrategy for RetainNone {
    fn select(&mut self, _old: Vec<Trajectory>, _keep: usize) -> Vec<Trajectory> {
        Vec::new()
    }
}

/// Applies the retention rule to produce the next dataset.
pub struct AggregationBuffer<S: RetentionStrategy> {
    strategy: S,
    retention_ratio: f64,
    max_trajectories: Option<usize>,
}

impl<S: RetentionStrategy> AggregationBuffer<S> {
    /// Create with a retention ratio in `[0, 1]`.
    pub fn new(strategy: S, retention_ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&retention_ratio) {
            return Err(MbrlError::invalid_config(
                "retention_ratio",
                format!("must be in [0, 1], got {}", retention_ratio),
            ));
        }
        Ok(Self {
            strategy,
            retention_ratio,
            max_trajectories: None,
        })
    }

    /// Cap the number of retained old trajectories.
    pub fn with_max_trajectories(mut self, max: Option<usize>) -> Self {
        self.max_trajectories = max;
        self
    }

    pub fn retention_ratio(&self) -> f64 {
        self.retention_ratio
    }

    /// How many old trajectories survive when the old dataset has `old_len`.
    pub fn retained_count(&self, old_len: usize) -> usize {
        let keep = self.uncapped_count(old_len);
        match self.max_trajectories {
            Some(max) => keep.min(max),
            None => keep,
        }
    }

    // `1.0 / 9.0 * 9.0` must floor to 1, not 0.
    fn uncapped_count(&self, old_len: usize) -> usize {
        (old_len as f64 * self.retention_ratio + 1e-9).floor() as usize
    }

    /// Build `new ∪ select(old, keep)`. New trajectories come first.
    pub fn aggregate(&mut self, old: Dataset, new: Vec<Trajectory>) -> Dataset {
        let old_len = old.len();
        let keep = self.retained_count(old_len);
        let uncapped = self.uncapped_count(old_len);
        if keep < uncapped {
            log::warn!(
                "Retention cap binds: keeping {} of {} old trajectories (ratio would keep {})",
                keep,
                old_len,
                uncapped
            );
        }

        let retained = self.strategy.select(old.into_trajectories(), keep);
        log::debug!(
            "Aggregated dataset: {} new + {} retained of {} old",
            new.len(),
            retained.len(),
            old_len
        );

        let mut dataset = Dataset::from_trajectories(new);
        dataset.extend(retained);
        dataset
    }
}
