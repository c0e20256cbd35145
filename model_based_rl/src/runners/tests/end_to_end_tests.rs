//! End-to-end learning test on a 1-D integrator.
//!
//! The system is `s' = s + a` with reward `-s^2`. After bootstrapping on five
//! random rollouts and one fit, MPC with the learned model must push the
//! state toward the origin and do better than the do-nothing action.

use burn::backend::{Autodiff, NdArray};

use super::{LinearEnv, RecordingLogger};
use crate::controllers::{MpcController, Policy};
use crate::cost::{CostFunction, QuadraticCost};
use crate::environment::Environment;
use crate::runners::config::TrainingConfig;
use crate::runners::trainer::ModelBasedTrainer;

type B = Autodiff<NdArray<f32>>;
type InnerB = NdArray<f32>;

fn linear_system_config() -> TrainingConfig {
    TrainingConfig::new()
        .with_dagger_iters(1)
        .with_num_random_rollouts(5)
        .with_env_horizon(10)
        .with_num_onpol_rollouts(2)
        .with_learning_rate(5e-3)
        .with_dynamics_iters(200)
        .with_batch_size(16)
        .with_hidden_layers(2)
        .with_hidden_units(32)
        .with_mpc_horizon(5)
        .with_num_simulated_paths(200)
        .with_seed(7)
}

/// Test that the learned planner beats a constant zero action.
/// INTENT: The whole loop (sample, normalize, fit, plan) produces a controller
/// that actually uses the learned dynamics.
#[test]
fn test_mpc_beats_constant_baseline_on_linear_system() {
    let mut trainer: ModelBasedTrainer<B, LinearEnv, QuadraticCost> = ModelBasedTrainer::new(
        linear_system_config(),
        LinearEnv::new(11),
        QuadraticCost::regulator(1, 1),
        Default::default(),
    )
    .unwrap();

    let mut session = trainer.bootstrap().unwrap();
    let snapshot = trainer
        .run_iteration(&mut session, &mut RecordingLogger::default())
        .unwrap();
    assert!(snapshot.model_loss.unwrap().is_finite());

    // One-step model accuracy on the data range.
    let predicted = session.model().predict(&[1.5, -0.5], &[-1.0, 0.5]).unwrap();
    assert!((predicted[0] - 0.5).abs() < 0.3, "predicted {}", predicted[0]);
    assert!((predicted[1] - 0.0).abs() < 0.3, "predicted {}", predicted[1]);

    let mut mpc = MpcController::<InnerB, _, _>::new(
        session.model(),
        trainer.cost(),
        trainer.env().action_space().clone(),
        trainer.config().mpc_config(),
        123,
    )
    .unwrap();

    let state = [1.5f32];
    let action = mpc.get_action(&state).unwrap();
    let next = state[0] + action[0];

    assert!(action[0] < 0.0, "expected a negative action, got {}", action[0]);
    assert!(next.abs() < state[0].abs(), "next state {} is not closer to 0", next);

    let cost = trainer.cost();
    let planned = cost.step_cost(&state, &action, &[next]);
    let baseline = cost.step_cost(&state, &[0.0], &state);
    assert!(planned < baseline, "planned {} vs baseline {}", planned, baseline);
}

/// Test that MPC rollouts score better than random ones on the true system.
#[test]
fn test_onpolicy_returns_beat_random_returns() {
    let mut trainer: ModelBasedTrainer<B, LinearEnv, QuadraticCost> = ModelBasedTrainer::new(
        linear_system_config().with_num_onpol_rollouts(5),
        LinearEnv::new(21),
        QuadraticCost::regulator(1, 1),
        Default::default(),
    )
    .unwrap();

    let mut session = trainer.bootstrap().unwrap();
    let random_return: f32 = session
        .dataset()
        .trajectories()
        .iter()
        .map(|t| t.episode_return())
        .sum::<f32>()
        / session.dataset().len() as f32;

    let snapshot = trainer
        .run_iteration(&mut session, &mut RecordingLogger::default())
        .unwrap();

    assert!(
        snapshot.returns.mean > random_return,
        "MPC average return {} should beat random {}",
        snapshot.returns.mean,
        random_return
    );
}
