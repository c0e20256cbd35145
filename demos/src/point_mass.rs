//! Model-Based RL on a 2-D point mass
//!
//! Double integrator reaching the origin. Positions and velocities are
//! observed directly, the action is a bounded force on each axis.
//!
//! # Environment
//!
//! - Observation: [x, y, vx, vy] (4D)
//! - Action: force in [-1.0, 1.0]² (2D continuous)
//! - Reward: -(x² + y²) - 0.01*|force|²
//!
//! The planning cost is a [`QuadraticCost`] that weights positions only,
//! computed on the backend for all candidates at once.

use burn::backend::{Autodiff, NdArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use model_based_rl::{
    ActionSpace, ConsoleLogger, EnvStep, Environment, MbrlError, ModelBasedTrainer, QuadraticCost, Result,
    TrainingConfig,
};

type B = Autodiff<NdArray<f32>>;

const DT: f32 = 0.1;
const MAX_FORCE: f32 = 1.0;
const START_RANGE: f32 = 2.0;

/// Frictionless point mass on a plane.
pub struct PointMassEnv {
    state: [f32; 4],
    space: ActionSpace,
    rng: StdRng,
}

impl PointMassEnv {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            state: [0.0; 4],
            space: ActionSpace::uniform(2, -MAX_FORCE, MAX_FORCE)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Environment for PointMassEnv {
    fn observation_size(&self) -> usize {
        4
    }

    fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.state = [
            self.rng.gen_range(-START_RANGE..=START_RANGE),
            self.rng.gen_range(-START_RANGE..=START_RANGE),
            0.0,
            0.0,
        ];
        Ok(self.state.to_vec())
    }

    fn step(&mut self, action: &[f32]) -> Result<EnvStep> {
        if action.len() != 2 {
            return Err(MbrlError::Environment(format!(
                "point mass expects 2 action dims, got {}",
                action.len()
            )));
        }
        let fx = action[0].clamp(-MAX_FORCE, MAX_FORCE);
        let fy = action[1].clamp(-MAX_FORCE, MAX_FORCE);

        let [x, y, vx, vy] = self.state;
        let vx = vx + fx * DT;
        let vy = vy + fy * DT;
        self.state = [x + vx * DT, y + vy * DT, vx, vy];

        let [x, y, _, _] = self.state;
        let reward = -(x * x + y * y) - 0.01 * (fx * fx + fy * fy);
        Ok(EnvStep::new(self.state.to_vec(), reward, false))
    }
}

/// Position-only regulator with a light action penalty.
pub fn planning_cost() -> Result<QuadraticCost> {
    QuadraticCost::new(vec![0.0; 4], vec![1.0, 1.0, 0.0, 0.0], vec![0.01, 0.01])
}

pub fn quick_config() -> TrainingConfig {
    TrainingConfig::new()
        .with_dagger_iters(4)
        .with_num_random_rollouts(10)
        .with_num_onpol_rollouts(3)
        .with_env_horizon(100)
        .with_mpc_horizon(10)
        .with_num_simulated_paths(300)
        .with_hidden_units(64)
        .with_dynamics_iters(40)
        .with_batch_size(128)
}

pub fn run(config: TrainingConfig) -> Result<()> {
    println!("=== Model-Based RL: Point Mass ===");

    let env = PointMassEnv::new(config.seed)?;
    let mut trainer: ModelBasedTrainer<B, _, _> =
        ModelBasedTrainer::new(config, env, planning_cost()?, Default::default())?;

    let report = trainer.run(&mut ConsoleLogger::new())?;
    if let Some(last) = report.last() {
        println!("Final AverageReturn {:.2}", last.returns.mean);
    }
    Ok(())
}
