//! Normalization statistics for dynamics model inputs and outputs.
//!
//! Three per-dimension mean/std pairs are computed once from a dataset:
//!
//! | Pair     | Source                          | Used for                    |
//! |----------|---------------------------------|-----------------------------|
//! | `state`  | observations `s_t`              | network input               |
//! | `action` | actions `a_t`                   | network input               |
//! | `delta`  | `s_{t+1} - s_t`                 | network target / output     |
//!
//! Every standard deviation is the population std plus `epsilon`, so it is
//! strictly positive and `(x - mean) / std` never divides by zero, even for
//! dimensions that are constant across the whole dataset.

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{MbrlError, Result};
use super::running_stats::RunningMeanStd;
use super::transition::Trajectory;
use crate::buffers::Dataset;

/// Default floor added to every standard deviation.
pub const DEFAULT_STD_EPSILON: f64 = 1e-8;

/// Per-dimension mean and (strictly positive) standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl MeanStd {
    /// Build from explicit vectors.
    ///
    /// Fails if the lengths differ or any std is not strictly positive.
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        if mean.len() != std.len() {
            return Err(MbrlError::dimension_mismatch("std vector", mean.len(), std.len()));
        }
        if let Some(bad) = std.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(MbrlError::invalid_config(
                "std",
                format!("standard deviations must be finite and > 0, got {}", bad),
            ));
        }
        Ok(Self { mean, std })
    }

    /// Identity transform (mean 0, std 1).
    pub fn identity(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            std: vec![1.0; dim],
        }
    }

    fn from_running(stats: &RunningMeanStd, epsilon: f64) -> Self {
        Self {
            mean: stats.mean().iter().map(|&m| m as f32).collect(),
            std: stats
                .std_plus_epsilon(epsilon)
                .into_iter()
                .map(|s| (s as f32).max(f32::MIN_POSITIVE))
                .collect(),
        }
    }

    /// Dimensionality.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// `(x - mean) / std` over a flattened batch of `dim`-sized rows.
    pub fn normalize(&self, batch: &[f32]) -> Vec<f32> {
        let dim = self.dim();
        debug_assert_eq!(batch.len() % dim.max(1), 0);
        batch
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let d = i % dim;
                (x - self.mean[d]) / self.std[d]
            })
            .collect()
    }

    /// `x * std + mean` over a flattened batch of `dim`-sized rows.
    pub fn denormalize(&self, batch: &[f32]) -> Vec<f32> {
        let dim = self.dim();
        debug_assert_eq!(batch.len() % dim.max(1), 0);
        batch
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let d = i % dim;
                x * self.std[d] + self.mean[d]
            })
            .collect()
    }

    /// Mean as a `[1, dim]` tensor for broadcasting.
    pub fn mean_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.mean.as_slice(), device).reshape([1, self.dim()])
    }

    /// Std as a `[1, dim]` tensor for broadcasting.
    pub fn std_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.std.as_slice(), device).reshape([1, self.dim()])
    }

    /// Normalize a `[batch, dim]` tensor.
    pub fn normalize_tensor<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = x.device();
        (x - self.mean_tensor::<B>(&device)) / self.std_tensor::<B>(&device)
    }

    /// Denormalize a `[batch, dim]` tensor.
    pub fn denormalize_tensor<B: Backend>(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = x.device();
        x * self.std_tensor::<B>(&device) + self.mean_tensor::<B>(&device)
    }
}

/// State, action and delta statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub state: MeanStd,
    pub delta: MeanStd,
    pub action: MeanStd,
}

impl NormalizationStats {
    /// Compute statistics over a whole dataset.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Self::from_trajectories(dataset.trajectories())
    }

    /// Same as [`Self::from_dataset`] with a custom std floor.
    pub fn from_dataset_with_epsilon(dataset: &Dataset, epsilon: f64) -> Result<Self> {
        Self::from_trajectories_with_epsilon(dataset.trajectories(), epsilon)
    }

    /// Compute statistics over every transition of every trajectory.
    ///
    /// Fails with [`MbrlError::EmptyDataset`] when there are no transitions.
    pub fn from_trajectories(trajectories: &[Trajectory]) -> Result<Self> {
        Self::from_trajectories_with_epsilon(trajectories, DEFAULT_STD_EPSILON)
    }

    /// Same as [`Self::from_trajectories`] with a custom std floor.
    pub fn from_trajectories_with_epsilon(trajectories: &[Trajectory], epsilon: f64) -> Result<Self> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(MbrlError::invalid_config("epsilon", "must be finite and > 0"));
        }

        let first = trajectories
            .iter()
            .flat_map(|t| t.iter())
            .next()
            .ok_or_else(|| MbrlError::empty_dataset("computing normalization statistics"))?;
        let state_dim = first.observation.len();
        let action_dim = first.action.len();

        // One accumulator per trajectory and quantity, merged afterwards.
        let mut states = Vec::with_capacity(trajectories.len());
        let mut deltas = Vec::with_capacity(trajectories.len());
        let mut actions = Vec::with_capacity(trajectories.len());
        for trajectory in trajectories {
            let mut state = RunningMeanStd::new(state_dim);
            let mut delta = RunningMeanStd::new(state_dim);
            let mut action = RunningMeanStd::new(action_dim);

            for transition in trajectory.iter() {
                check_dim("observation", state_dim, transition.observation.len())?;
                check_dim("next_observation", state_dim, transition.next_observation.len())?;
                check_dim("action", action_dim, transition.action.len())?;

                state.update(&transition.observation);
                delta.update(&transition.delta());
                action.update(&transition.action);
            }
            states.push(state);
            deltas.push(delta);
            actions.push(action);
        }

        let merge = |partials: &[RunningMeanStd], dim: usize| {
            RunningMeanStd::merge_all(partials).unwrap_or_else(|| RunningMeanStd::new(dim))
        };
        let state = merge(&states, state_dim);
        let delta = merge(&deltas, state_dim);
        let action = merge(&actions, action_dim);

        Ok(Self {
            state: MeanStd::from_running(&state, epsilon),
            delta: MeanStd::from_running(&delta, epsilon),
            action: MeanStd::from_running(&action, epsilon),
        })
    }

    /// Identity statistics for the given dimensions.
    pub fn identity(state_dim: usize, action_dim: usize) -> Self {
        Self {
            state: MeanStd::identity(state_dim),
            delta: MeanStd::identity(state_dim),
            action: MeanStd::identity(action_dim),
        }
    }

    /// State dimensionality.
    pub fn state_dim(&self) -> usize {
        self.state.dim()
    }

    /// Action dimensionality.
    pub fn action_dim(&self) -> usize {
        self.action.dim()
    }

    /// All six std vectors are strictly positive.
    pub fn all_std_positive(&self) -> bool {
        [&self.state.std, &self.delta.std, &self.action.std]
            .iter()
            .all(|v| v.iter().all(|&s| s > 0.0))
    }
}

fn check_dim(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MbrlError::dimension_mismatch(what, expected, actual));
    }
    Ok(())
}
