//! Model-based training loop with on-policy data aggregation.
//!
//! ```text
//! bootstrap:   random rollouts ─► dataset D ─► stats ─► untrained model
//!
//! iteration i: fit(model, D)
//!              MPC(model, cost) rollouts ─► new paths ─► metrics ─► logger
//!              D ◄── new ∪ retain(D, floor(|D| · ratio))
//! ```
//!
//! The planner is rebuilt every iteration from a shared borrow of the freshly
//! fit model, so fitting and planning can never overlap.

use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{NormalizationMode, TrainingConfig};
use crate::actors::Sampler;
use crate::buffers::{AggregationBuffer, Dataset, RetentionStrategy, UniformSubsample};
use crate::controllers::{MpcController, RandomController};
use crate::core::error::{MbrlError, Result};
use crate::core::normalization::NormalizationStats;
use crate::core::transition::Trajectory;
use crate::cost::CostFunction;
use crate::dynamics::NnDynamicsModel;
use crate::environment::Environment;
use crate::metrics::{IterationSnapshot, MetricsLogger};

/// Mutable state of one training run.
pub struct TrainingSession<B: AutodiffBackend> {
    dataset: Dataset,
    model: NnDynamicsModel<B>,
    iteration: usize,
    env_steps: usize,
    history: Vec<IterationSnapshot>,
}

impl<B: AutodiffBackend> TrainingSession<B> {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn model(&self) -> &NnDynamicsModel<B> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut NnDynamicsModel<B> {
        &mut self.model
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Environment steps taken so far, bootstrap included.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Snapshots of every completed iteration.
    pub fn history(&self) -> &[IterationSnapshot] {
        &self.history
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub snapshots: Vec<IterationSnapshot>,
    pub dataset_trajectories: usize,
    pub env_steps: usize,
}

impl TrainingReport {
    pub fn last(&self) -> Option<&IterationSnapshot> {
        self.snapshots.last()
    }
}

/// Drives bootstrap and aggregation iterations against one environment.
pub struct ModelBasedTrainer<B, E, C, S = UniformSubsample>
where
    B: AutodiffBackend,
    E: Environment,
    C: CostFunction,
    S: RetentionStrategy,
{
    config: TrainingConfig,
    env: E,
    cost: C,
    device: B::Device,
    rng: StdRng,
    aggregation: AggregationBuffer<S>,
}

impl<B, E, C> ModelBasedTrainer<B, E, C, UniformSubsample>
where
    B: AutodiffBackend,
    E: Environment,
    C: CostFunction,
{
    /// Validate `config` against `env` and build a trainer.
    pub fn new(config: TrainingConfig, env: E, cost: C, device: B::Device) -> Result<Self> {
        config.validate()?;
        if env.observation_size() == 0 {
            return Err(MbrlError::invalid_config("observation_size", "must be > 0"));
        }
        if let Some(cost_dim) = cost.state_dim() {
            if cost_dim != env.observation_size() {
                return Err(MbrlError::dimension_mismatch(
                    "cost state",
                    env.observation_size(),
                    cost_dim,
                ));
            }
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let aggregation = AggregationBuffer::new(UniformSubsample::new(rng.gen()), config.retention_ratio)?
            .with_max_trajectories(config.max_dataset_trajectories);

        Ok(Self {
            config,
            env,
            cost,
            device,
            rng,
            aggregation,
        })
    }
}

impl<B, E, C, S> ModelBasedTrainer<B, E, C, S>
where
    B: AutodiffBackend,
    E: Environment,
    C: CostFunction,
    S: RetentionStrategy,
{
    /// Swap the retention strategy used during aggregation.
    pub fn with_retention_strategy<S2: RetentionStrategy>(
        self,
        strategy: S2,
    ) -> Result<ModelBasedTrainer<B, E, C, S2>> {
        let aggregation = AggregationBuffer::new(strategy, self.config.retention_ratio)?
            .with_max_trajectories(self.config.max_dataset_trajectories);
        Ok(ModelBasedTrainer {
            config: self.config,
            env: self.env,
            cost: self.cost,
            device: self.device,
            rng: self.rng,
            aggregation,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn cost(&self) -> &C {
        &self.cost
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Collect random rollouts, compute statistics and build the model.
    pub fn bootstrap(&mut self) -> Result<TrainingSession<B>> {
        let mut random = RandomController::new(self.env.action_space().clone(), self.rng.gen());
        let paths = Sampler::rollout(
            &mut self.env,
            &mut random,
            self.config.num_random_rollouts,
            self.config.env_horizon,
        )?;
        let env_steps = paths.iter().map(Trajectory::len).sum();

        let dataset = Dataset::from_trajectories(paths);
        let stats = NormalizationStats::from_dataset(&dataset)?;
        let dynamics = self.config.dynamics_config().with_seed(self.rng.gen());
        let model = NnDynamicsModel::new(dynamics, stats, &self.device)?;

        log::info!(
            "Bootstrapped with {} random rollouts ({} transitions)",
            dataset.len(),
            dataset.num_transitions()
        );

        Ok(TrainingSession {
            dataset,
            model,
            iteration: 0,
            env_steps,
            history: Vec::new(),
        })
    }

    /// Fit, collect on-policy data with MPC, aggregate and report.
    pub fn run_iteration<L>(&mut self, session: &mut TrainingSession<B>, logger: &mut L) -> Result<IterationSnapshot>
    where
        L: MetricsLogger + ?Sized,
    {
        if self.config.normalization_mode == NormalizationMode::RecomputeEachIteration {
            let stats = NormalizationStats::from_dataset(&session.dataset)?;
            session.model.set_stats(stats)?;
        }

        let fit = session.model.fit(&session.dataset)?;
        log::debug!(
            "iteration {}: fit {} updates, loss {:.6} -> {:.6}",
            session.iteration,
            fit.updates,
            fit.first_epoch_loss,
            fit.final_epoch_loss
        );

        let new_paths = {
            let mut mpc = MpcController::<B::InnerBackend, _, _>::new(
                &session.model,
                &self.cost,
                self.env.action_space().clone(),
                self.config.mpc_config(),
                self.rng.gen(),
            )?;
            Sampler::rollout(
                &mut self.env,
                &mut mpc,
                self.config.num_onpol_rollouts,
                self.config.env_horizon,
            )?
        };
        session.env_steps += new_paths.iter().map(Trajectory::len).sum::<usize>();

        let snapshot = IterationSnapshot::from_trajectories(session.iteration, &new_paths, &self.cost)?;

        let old = std::mem::take(&mut session.dataset);
        session.dataset = self.aggregation.aggregate(old, new_paths);

        let snapshot = snapshot
            .with_dataset_trajectories(session.dataset.len())
            .with_model_loss(fit.final_epoch_loss);

        log::info!(
            "iteration {}: AverageReturn {:.3}, AverageCost {:.3}, dataset {} trajectories",
            snapshot.iteration,
            snapshot.returns.mean,
            snapshot.cost.mean,
            snapshot.dataset_trajectories
        );
        logger.log(&snapshot);
        logger.flush();

        session.iteration += 1;
        session.history.push(snapshot.clone());
        Ok(snapshot)
    }

    /// Bootstrap and run `dagger_iters` iterations, returning the session.
    pub fn run_session<L>(&mut self, logger: &mut L) -> Result<(TrainingSession<B>, TrainingReport)>
    where
        L: MetricsLogger + ?Sized,
    {
        let mut session = self.bootstrap()?;
        for _ in 0..self.config.dagger_iters {
            self.run_iteration(&mut session, logger)?;
        }

        let report = TrainingReport {
            snapshots: session.history.clone(),
            dataset_trajectories: session.dataset.len(),
            env_steps: session.env_steps,
        };
        Ok((session, report))
    }

    /// Bootstrap and run `dagger_iters` iterations.
    pub fn run<L>(&mut self, logger: &mut L) -> Result<TrainingReport>
    where
        L: MetricsLogger + ?Sized,
    {
        self.run_session(logger).map(|(_, report)| report)
    }
}
