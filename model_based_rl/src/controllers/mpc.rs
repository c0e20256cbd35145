//! Random-shooting model predictive control.
//!
//! For every decision the planner:
//!
//! 1. samples `num_simulated_paths` action sequences of length `horizon`
//!    uniformly from the action space,
//! 2. rolls all of them forward through the learned model at once
//!    (one `predict_batch` call per horizon step),
//! 3. sums the task cost along each predicted path,
//! 4. executes only the first action of the cheapest sequence.
//!
//! The controller borrows the model and cost function, so it cannot outlive
//! them and the model cannot be refit while a controller exists.

use std::marker::PhantomData;

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::candidates::{ActionSequences, SimulatedRollouts};
use super::Policy;
use crate::core::error::{MbrlError, Result};
use crate::cost::CostFunction;
use crate::dynamics::DynamicsModel;
use crate::environment::ActionSpace;

/// Planner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MpcConfig {
    /// Steps simulated per candidate.
    pub horizon: usize,
    /// Number of candidate sequences per decision.
    pub num_simulated_paths: usize,
}

impl Default for MpcConfig {
    fn default() -> Self {
        Self {
            horizon: 15,
            num_simulated_paths: 1000,
        }
    }
}

impl MpcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_num_simulated_paths(mut self, n: usize) -> Self {
        self.num_simulated_paths = n;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(MbrlError::invalid_config("mpc_horizon", "must be > 0"));
        }
        if self.num_simulated_paths == 0 {
            return Err(MbrlError::invalid_config("num_simulated_paths", "must be > 0"));
        }
        Ok(())
    }
}

/// Result of scoring a set of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub best_index: usize,
    pub best_cost: f32,
    pub first_action: Vec<f32>,
}

/// Random-shooting MPC over a borrowed dynamics model and cost function.
pub struct MpcController<'a, B, M, C>
where
    B: Backend,
    M: DynamicsModel<B>,
    C: CostFunction,
{
    model: &'a M,
    cost: &'a C,
    action_space: ActionSpace,
    config: MpcConfig,
    rng: StdRng,
    _backend: PhantomData<B>,
}

impl<'a, B, M, C> MpcController<'a, B, M, C>
where
    B: Backend,
    M: DynamicsModel<B>,
    C: CostFunction,
{
    /// Create a planner. The same seed, model and state give the same action.
    pub fn new(
        model: &'a M,
        cost: &'a C,
        action_space: ActionSpace,
        config: MpcConfig,
        seed: u64,
    ) -> Result<Self> {
        config.validate()?;
        if action_space.dim() != model.action_dim() {
            return Err(MbrlError::dimension_mismatch(
                "action space",
                model.action_dim(),
                action_space.dim(),
            ));
        }
        if let Some(cost_dim) = cost.state_dim() {
            if cost_dim != model.state_dim() {
                return Err(MbrlError::dimension_mismatch("cost state", model.state_dim(), cost_dim));
            }
        }
        Ok(Self {
            model,
            cost,
            action_space,
            config,
            rng: StdRng::seed_from_u64(seed),
            _backend: PhantomData,
        })
    }

    pub fn config(&self) -> &MpcConfig {
        &self.config
    }

    /// Draw a fresh set of candidates from the action space.
    pub fn sample_candidates(&mut self) -> ActionSequences {
        ActionSequences::sample_uniform(
            &self.action_space,
            self.config.num_simulated_paths,
            self.config.horizon,
            &mut self.rng,
        )
    }

    /// Score `candidates` from `state` and pick the cheapest.
    pub fn plan(&self, state: &[f32], candidates: &ActionSequences) -> Result<PlanOutcome> {
        let rollouts = self.rollout(state, candidates, false)?;
        let (best_index, best_cost) = rollouts
            .best()
            .ok_or_else(|| MbrlError::invalid_config("candidates", "need at least one sequence"))?;
        Ok(PlanOutcome {
            best_index,
            best_cost,
            first_action: candidates.action(best_index, 0).to_vec(),
        })
    }

    /// Simulate `candidates` from `state`, recording every predicted state.
    pub fn simulate(&self, state: &[f32], candidates: &ActionSequences) -> Result<SimulatedRollouts> {
        self.rollout(state, candidates, true)
    }

    fn rollout(
        &self,
        state: &[f32],
        candidates: &ActionSequences,
        record_states: bool,
    ) -> Result<SimulatedRollouts> {
        let state_dim = self.model.state_dim();
        let action_dim = self.model.action_dim();
        if state.len() != state_dim {
            return Err(MbrlError::dimension_mismatch("state", state_dim, state.len()));
        }
        if candidates.action_dim() != action_dim {
            return Err(MbrlError::dimension_mismatch(
                "candidate actions",
                action_dim,
                candidates.action_dim(),
            ));
        }
        let n = candidates.num_sequences();
        if n == 0 || candidates.horizon() == 0 {
            return Err(MbrlError::invalid_config("candidates", "need at least one non-empty sequence"));
        }

        let device = self.model.device();
        let start = state.repeat(n);
        let mut recorded = if record_states {
            let mut buf = Vec::with_capacity((candidates.horizon() + 1) * n * state_dim);
            buf.extend_from_slice(&start);
            buf
        } else {
            Vec::new()
        };

        let mut states = Tensor::<B, 1>::from_floats(start.as_slice(), &device).reshape([n, state_dim]);
        let mut total = Tensor::<B, 1>::zeros([n], &device);
        // `x - x` is 0 for finite x and NaN for NaN or Inf, so this stays 0
        // per candidate only while every predicted state is finite.
        let mut state_check = Tensor::<B, 1>::zeros([n], &device);

        for t in 0..candidates.horizon() {
            let actions =
                Tensor::<B, 1>::from_floats(candidates.step(t), &device).reshape([n, action_dim]);
            let next = self.model.predict_batch(states.clone(), actions.clone());
            total = total + self.cost.batch_step_cost(states, actions, next.clone());
            state_check = state_check + (next.clone() - next.clone()).abs().sum_dim(1).flatten::<1>(0, 1);
            if record_states {
                recorded.extend(next.clone().into_data().iter::<f32>());
            }
            states = next;
        }

        let checks: Vec<f32> = state_check
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| MbrlError::Tensor(format!("{:?}", e)))?;
        if let Some(i) = checks.iter().position(|c| !c.is_finite()) {
            return Err(MbrlError::non_finite(format!("predicted state of candidate {}", i)));
        }

        let costs: Vec<f32> = total
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| MbrlError::Tensor(format!("{:?}", e)))?;
        if let Some(i) = costs.iter().position(|c| !c.is_finite()) {
            return Err(MbrlError::non_finite(format!("predicted cost of candidate {}", i)));
        }

        Ok(SimulatedRollouts::new(
            costs,
            recorded,
            n,
            candidates.horizon(),
            state_dim,
        ))
    }
}

impl<B, M, C> Policy for MpcController<'_, B, M, C>
where
    B: Backend,
    M: DynamicsModel<B>,
    C: CostFunction,
{
    fn get_action(&mut self, state: &[f32]) -> Result<Vec<f32>> {
        let candidates = self.sample_candidates();
        let outcome = self.plan(state, &candidates)?;
        log::trace!(
            "mpc picked candidate {} with predicted cost {:.4}",
            outcome.best_index,
            outcome.best_cost
        );
        Ok(outcome.first_action)
    }
}
