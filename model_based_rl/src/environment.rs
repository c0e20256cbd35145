//! Environment abstraction.
//!
//! The environment is an external collaborator: the core only needs
//! `reset`, `step` and a bounded continuous action space to sample from.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{MbrlError, Result};

/// Result of stepping the environment once.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvStep {
    /// Observation after the step
    pub observation: Vec<f32>,
    /// Reward received
    pub reward: f32,
    /// Episode ended (goal, failure, ...)
    pub done: bool,
}

impl EnvStep {
    /// Create a new step result.
    pub fn new(observation: Vec<f32>, reward: f32, done: bool) -> Self {
        Self {
            observation,
            reward,
            done,
        }
    }
}

/// Single (non-vectorized) environment with continuous actions.
///
/// Failures from `reset` or `step` should be reported as
/// [`MbrlError::Environment`]; they abort the current rollout.
pub trait Environment {
    /// Size of the observation vector.
    fn observation_size(&self) -> usize;

    /// Bounds of the continuous action space.
    fn action_space(&self) -> &ActionSpace;

    /// Start a new episode and return the initial observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Apply an action.
    fn step(&mut self, action: &[f32]) -> Result<EnvStep>;
}

/// Bounded box action space `[low, high]` per dimension.
///
/// Bounds are validated on construction, so a value of this type can always
/// be sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ActionSpaceBounds")]
pub struct ActionSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

/// Unvalidated wire form of [`ActionSpace`].
#[derive(Deserialize)]
struct ActionSpaceBounds {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl TryFrom<ActionSpaceBounds> for ActionSpace {
    type Error = MbrlError;

    fn try_from(bounds: ActionSpaceBounds) -> Result<Self> {
        Self::new(bounds.low, bounds.high)
    }
}

impl ActionSpace {
    /// Create a box action space.
    ///
    /// Rejects empty, mismatched, unbounded (non-finite) or inverted bounds,
    /// and ranges whose width `high - low` overflows `f32`.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        if low.is_empty() {
            return Err(MbrlError::invalid_config("action_space", "must have at least one dimension"));
        }
        if low.len() != high.len() {
            return Err(MbrlError::dimension_mismatch("action_space.high", low.len(), high.len()));
        }
        for (i, (&lo, &hi)) in low.iter().zip(&high).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(MbrlError::invalid_config(
                    "action_space",
                    format!("dimension {} is unbounded ([{}, {}])", i, lo, hi),
                ));
            }
            if lo > hi {
                return Err(MbrlError::invalid_config(
                    "action_space",
                    format!("dimension {} has low {} > high {}", i, lo, hi),
                ));
            }
            // Uniform sampling divides the width by a factor just below 1.
            if !((hi - lo) / (1.0 - f32::EPSILON)).is_finite() {
                return Err(MbrlError::invalid_config(
                    "action_space",
                    format!("dimension {} range [{}, {}] is too wide to sample", i, lo, hi),
                ));
            }
        }
        Ok(Self { low, high })
    }

    /// Same bounds `[low, high]` on every one of `dim` dimensions.
    pub fn uniform(dim: usize, low: f32, high: f32) -> Result<Self> {
        Self::new(vec![low; dim], vec![high; dim])
    }

    /// Number of action dimensions.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Lower bounds.
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper bounds.
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Draw one action uniformly from the box.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f32> {
        let mut action = Vec::with_capacity(self.dim());
        self.sample_into(rng, &mut action);
        action
    }

    /// Append one uniformly drawn action to `out`.
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Vec<f32>) {
        out.extend(
            self.low
                .iter()
                .zip(&self.high)
                .map(|(&lo, &hi)| if lo == hi { lo } else { rng.gen_range(lo..=hi) }),
        );
    }

    /// Whether `action` lies inside the box.
    pub fn contains(&self, action: &[f32]) -> bool {
        action.len() == self.dim()
            && action
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(&a, (&lo, &hi))| a >= lo && a <= hi)
    }
}
