//! Model-Based RL on Pendulum
//!
//! Random-shooting MPC over a learned dynamics model, trained with on-policy
//! aggregation.
//!
//! # Environment: Pendulum-v1
//!
//! - Observation: [cos(θ), sin(θ), θ_dot] (3D)
//! - Action: torque in [-2.0, 2.0] (1D continuous)
//! - Reward: -θ² - 0.1*θ_dot² - 0.001*torque²
//! - Goal: Balance pendulum upright (θ = 0)
//!
//! The planner cost is the negated reward evaluated on the predicted next
//! observation, so MPC and the environment agree on what "good" means.

use std::f32::consts::PI;

use burn::backend::{Autodiff, NdArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use model_based_rl::{
    ActionSpace, CSVLogger, ConsoleLogger, CostFunction, EnvStep, Environment, MbrlError, ModelBasedTrainer,
    MultiLogger, Result, TrainingConfig,
};

// ============================================================================
// Backend Type
// ============================================================================

type B = Autodiff<NdArray<f32>>;

// ============================================================================
// Environment
// ============================================================================

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// Single-instance pendulum swing-up.
pub struct PendulumEnv {
    theta: f32,
    theta_dot: f32,
    space: ActionSpace,
    rng: StdRng,
}

impl PendulumEnv {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            theta: 0.0,
            theta_dot: 0.0,
            space: ActionSpace::uniform(1, -MAX_TORQUE, MAX_TORQUE)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.theta.cos(), self.theta.sin(), self.theta_dot]
    }
}

impl Environment for PendulumEnv {
    fn observation_size(&self) -> usize {
        3
    }

    fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.theta = self.rng.gen_range(-PI..=PI);
        self.theta_dot = self.rng.gen_range(-1.0..=1.0);
        Ok(self.observation())
    }

    fn step(&mut self, action: &[f32]) -> Result<EnvStep> {
        let torque = action
            .first()
            .copied()
            .ok_or_else(|| MbrlError::Environment("empty action".into()))?
            .clamp(-MAX_TORQUE, MAX_TORQUE);

        let theta = self.theta;
        let theta_dot = self.theta_dot;

        let new_theta_dot =
            (theta_dot + (3.0 * G / (2.0 * L) * theta.sin() + 3.0 / (M * L * L) * torque) * DT)
                .clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = angle_normalize(theta + new_theta_dot * DT);
        self.theta_dot = new_theta_dot;

        let cost = theta * theta + 0.1 * theta_dot * theta_dot + 0.001 * torque * torque;
        Ok(EnvStep::new(self.observation(), -cost, false))
    }
}

// ============================================================================
// Cost
// ============================================================================

/// Swing-up cost on the predicted observation.
pub struct PendulumCost;

impl CostFunction for PendulumCost {
    fn step_cost(&self, _state: &[f32], action: &[f32], next_state: &[f32]) -> f32 {
        let theta = next_state[1].atan2(next_state[0]);
        let theta_dot = next_state[2];
        let torque = action[0].clamp(-MAX_TORQUE, MAX_TORQUE);
        theta * theta + 0.1 * theta_dot * theta_dot + 0.001 * torque * torque
    }
}

// ============================================================================
// Training
// ============================================================================

/// Small settings that finish in a few minutes on CPU.
pub fn quick_config() -> TrainingConfig {
    TrainingConfig::new()
        .with_dagger_iters(5)
        .with_num_random_rollouts(10)
        .with_num_onpol_rollouts(2)
        .with_env_horizon(200)
        .with_mpc_horizon(10)
        .with_num_simulated_paths(200)
        .with_hidden_units(64)
        .with_dynamics_iters(30)
        .with_batch_size(256)
        .with_retention_ratio(0.5)
}

pub fn run(config: TrainingConfig) -> Result<()> {
    println!("=== Model-Based RL: Pendulum ===");
    println!(
        "dagger_iters={}, env_horizon={}, mpc_horizon={}, simulated_paths={}",
        config.dagger_iters, config.env_horizon, config.mpc_horizon, config.num_simulated_paths
    );

    let env = PendulumEnv::new(config.seed)?;
    let mut trainer: ModelBasedTrainer<B, _, _> =
        ModelBasedTrainer::new(config, env, PendulumCost, Default::default())?;

    let csv = CSVLogger::new("pendulum_mbrl.csv")
        .map_err(|e| MbrlError::Environment(format!("cannot open metrics file: {}", e)))?;
    let mut logger = MultiLogger::new().add(ConsoleLogger::new()).add(csv);

    let report = trainer.run(&mut logger)?;

    println!();
    if let Some(last) = report.last() {
        println!(
            "Final iteration {}: AverageReturn {:.2}, AverageCost {:.2}",
            last.iteration, last.returns.mean, last.cost.mean
        );
    }
    println!(
        "{} environment steps, {} trajectories in the final dataset",
        report.env_steps, report.dataset_trajectories
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_normalize() {
        assert!((angle_normalize(0.0)).abs() < 1e-6);
        assert!((angle_normalize(2.0 * PI + 0.5) - 0.5).abs() < 1e-5);
        assert!((angle_normalize(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_env_step_clamps_and_penalizes() {
        let mut env = PendulumEnv::new(0).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.len(), 3);

        let step = env.step(&[5.0]).unwrap();
        assert!(step.reward <= 0.0);
        assert!(step.observation[2].abs() <= MAX_SPEED);
        assert!(!step.done);
    }

    #[test]
    fn test_upright_is_cheapest() {
        let cost = PendulumCost;
        let upright = cost.step_cost(&[1.0, 0.0, 0.0], &[0.0], &[1.0, 0.0, 0.0]);
        let hanging = cost.step_cost(&[1.0, 0.0, 0.0], &[0.0], &[-1.0, 0.0, 0.0]);
        assert_eq!(upright, 0.0);
        assert!(hanging > 9.0);
    }
}
