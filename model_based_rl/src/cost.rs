//! Task cost functions.
//!
//! A cost function scores transitions `(s, a, s')`; trajectory costs are the
//! sum of step costs. The planner calls [`CostFunction::batch_step_cost`] once
//! per horizon step for all candidates at the same time, so implementations
//! that can express their cost as tensor math should override it.
//!
//! Cost functions are stateless: identical inputs always give identical
//! outputs.

use burn::prelude::*;

use crate::core::error::{MbrlError, Result};
use crate::core::transition::Trajectory;

/// Task-specific objective (lower is better).
pub trait CostFunction: Send + Sync {
    /// Cost of a single transition.
    fn step_cost(&self, state: &[f32], action: &[f32], next_state: &[f32]) -> f32;

    /// State width this cost is defined for, if it has a fixed one.
    ///
    /// Planners and trainers reject a model or environment whose state
    /// dimension differs.
    fn state_dim(&self) -> Option<usize> {
        None
    }

    /// Per-row step cost for a batch.
    ///
    /// Inputs are `[batch, state_dim]`, `[batch, action_dim]` and
    /// `[batch, state_dim]`; output is `[batch]`. The default reads the batch
    /// back to the host and calls [`CostFunction::step_cost`] per row.
    fn batch_step_cost<B: Backend>(
        &self,
        states: Tensor<B, 2>,
        actions: Tensor<B, 2>,
        next_states: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let device = states.device();
        let [batch, state_dim] = states.dims();
        let action_dim = actions.dims()[1];

        let s: Vec<f32> = states.into_data().iter::<f32>().collect();
        let a: Vec<f32> = actions.into_data().iter::<f32>().collect();
        let ns: Vec<f32> = next_states.into_data().iter::<f32>().collect();

        let costs: Vec<f32> = (0..batch)
            .map(|i| {
                self.step_cost(
                    &s[i * state_dim..(i + 1) * state_dim],
                    &a[i * action_dim..(i + 1) * action_dim],
                    &ns[i * state_dim..(i + 1) * state_dim],
                )
            })
            .collect();

        Tensor::<B, 1>::from_floats(costs.as_slice(), &device)
    }

    /// Cost of aligned, equal-length state/action/next-state sequences.
    fn path_cost<S, A, N>(&self, states: &[S], actions: &[A], next_states: &[N]) -> Result<f32>
    where
        S: AsRef<[f32]>,
        A: AsRef<[f32]>,
        N: AsRef<[f32]>,
    {
        if actions.len() != states.len() {
            return Err(MbrlError::dimension_mismatch("path actions", states.len(), actions.len()));
        }
        if next_states.len() != states.len() {
            return Err(MbrlError::dimension_mismatch(
                "path next_states",
                states.len(),
                next_states.len(),
            ));
        }
        Ok(states
            .iter()
            .zip(actions)
            .zip(next_states)
            .map(|((s, a), ns)| self.step_cost(s.as_ref(), a.as_ref(), ns.as_ref()))
            .sum())
    }

    /// Total cost of a recorded trajectory.
    fn trajectory_cost(&self, trajectory: &Trajectory) -> f32 {
        trajectory
            .iter()
            .map(|t| self.step_cost(&t.observation, &t.action, &t.next_observation))
            .sum()
    }
}

/// Weighted quadratic cost around a target state.
///
/// `cost = Σ_i w_i (s'_i - target_i)² + Σ_j r_j a_j²`
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticCost {
    target: Vec<f32>,
    state_weights: Vec<f32>,
    action_weights: Vec<f32>,
}

impl QuadraticCost {
    /// Create a quadratic cost.
    pub fn new(target: Vec<f32>, state_weights: Vec<f32>, action_weights: Vec<f32>) -> Result<Self> {
        if target.len() != state_weights.len() {
            return Err(MbrlError::dimension_mismatch(
                "state_weights",
                target.len(),
                state_weights.len(),
            ));
        }
        Ok(Self {
            target,
            state_weights,
            action_weights,
        })
    }

    /// Unit state weights, no action penalty, target at the origin.
    pub fn regulator(state_dim: usize, action_dim: usize) -> Self {
        Self {
            target: vec![0.0; state_dim],
            state_weights: vec![1.0; state_dim],
            action_weights: vec![0.0; action_dim],
        }
    }

    /// Set the action penalty weights.
    pub fn with_action_weights(mut self, weights: Vec<f32>) -> Self {
        self.action_weights = weights;
        self
    }
}

impl CostFunction for QuadraticCost {
    fn state_dim(&self) -> Option<usize> {
        Some(self.target.len())
    }

    fn step_cost(&self, _state: &[f32], action: &[f32], next_state: &[f32]) -> f32 {
        let state_term: f32 = next_state
            .iter()
            .zip(&self.target)
            .zip(&self.state_weights)
            .map(|((s, t), w)| w * (s - t) * (s - t))
            .sum();
        let action_term: f32 = action
            .iter()
            .zip(&self.action_weights)
            .map(|(a, r)| r * a * a)
            .sum();
        state_term + action_term
    }

    fn batch_step_cost<B: Backend>(
        &self,
        _states: Tensor<B, 2>,
        actions: Tensor<B, 2>,
        next_states: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let device = next_states.device();
        let state_dim = self.target.len();
        let action_dim = actions.dims()[1];

        let target = Tensor::<B, 1>::from_floats(self.target.as_slice(), &device).reshape([1, state_dim]);
        let w = Tensor::<B, 1>::from_floats(self.state_weights.as_slice(), &device).reshape([1, state_dim]);

        let diff = next_states - target;
        let state_term: Tensor<B, 2> = (diff.clone() * diff * w).sum_dim(1);

        let mut action_weights = self.action_weights.clone();
        action_weights.resize(action_dim, 0.0);
        let r = Tensor::<B, 1>::from_floats(action_weights.as_slice(), &device).reshape([1, action_dim]);
        let action_term: Tensor<B, 2> = (actions.clone() * actions * r).sum_dim(1);

        (state_term + action_term).flatten(0, 1)
    }
}

/// Cost function backed by a closure over `(s, a, s')`.
pub struct FnCost<F> {
    f: F,
}

impl<F> FnCost<F>
where
    F: Fn(&[f32], &[f32], &[f32]) -> f32 + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> CostFunction for FnCost<F>
where
    F: Fn(&[f32], &[f32], &[f32]) -> f32 + Send + Sync,
{
    fn step_cost(&self, state: &[f32], action: &[f32], next_state: &[f32]) -> f32 {
        (self.f)(state, action, next_state)
    }
}
