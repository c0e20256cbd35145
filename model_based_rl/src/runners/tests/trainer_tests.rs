//! Trainer tests: bootstrap, iteration bookkeeping and error propagation.
//!
//! Networks here are tiny and fits are short; these tests check plumbing,
//! not learning quality (see `end_to_end_tests` for that).

use burn::backend::{Autodiff, NdArray};

use super::{LinearEnv, RecordingLogger};
use crate::buffers::RetainNone;
use crate::core::error::MbrlError;
use crate::cost::QuadraticCost;
use crate::metrics::IterationSnapshot;
use crate::runners::config::{NormalizationMode, TrainingConfig};
use crate::runners::trainer::ModelBasedTrainer;

type B = Autodiff<NdArray<f32>>;

fn quick_config() -> TrainingConfig {
    TrainingConfig::new()
        .with_dagger_iters(2)
        .with_dynamics_iters(3)
        .with_batch_size(16)
        .with_num_random_rollouts(5)
        .with_num_onpol_rollouts(2)
        .with_num_simulated_paths(16)
        .with_env_horizon(6)
        .with_mpc_horizon(3)
        .with_hidden_units(8)
        .with_seed(0)
}

fn trainer(config: TrainingConfig) -> ModelBasedTrainer<B, LinearEnv, QuadraticCost> {
    ModelBasedTrainer::new(
        config,
        LinearEnv::new(1),
        QuadraticCost::regulator(1, 1),
        Default::default(),
    )
    .unwrap()
}

// ============================================================================
// Construction
// ============================================================================

/// Test that invalid configuration fails before any rollout.
/// INTENT: Errors surface at construction, not mid-run.
#[test]
fn test_new_validates_config() {
    let result = ModelBasedTrainer::<B, _, _>::new(
        quick_config().with_mpc_horizon(0),
        LinearEnv::new(0),
        QuadraticCost::regulator(1, 1),
        Default::default(),
    );
    assert!(matches!(result, Err(MbrlError::InvalidConfig { .. })));
}

/// Test that a cost built for another state width is rejected.
/// INTENT: Host and batched cost paths must see the same state layout.
#[test]
fn test_new_rejects_cost_state_dim_mismatch() {
    let result = ModelBasedTrainer::<B, _, _>::new(
        quick_config(),
        LinearEnv::new(0),
        QuadraticCost::regulator(2, 1),
        Default::default(),
    );
    assert!(matches!(
        result,
        Err(MbrlError::DimensionMismatch { expected: 1, actual: 2, .. })
    ));
}

// ============================================================================
// Bootstrap
// ============================================================================

/// Test that bootstrap collects the random dataset and builds matching stats.
#[test]
fn test_bootstrap() {
    let mut trainer = trainer(quick_config());
    let session = trainer.bootstrap().unwrap();

    assert_eq!(session.dataset().len(), 5);
    assert_eq!(session.dataset().num_transitions(), 30);
    assert_eq!(session.env_steps(), 30);
    assert_eq!(session.iteration(), 0);
    assert!(session.model().stats().all_std_positive());
    assert_eq!(session.model().stats().state_dim(), 1);
}

// ============================================================================
// Iterations
// ============================================================================

/// Test the aggregation size rule through the trainer.
/// INTENT: |D'| = num_onpol + floor(|D| * ratio).
#[test]
fn test_iteration_dataset_sizes() {
    let mut trainer = trainer(quick_config().with_retention_ratio(0.5));
    let mut session = trainer.bootstrap().unwrap();
    let mut logger = RecordingLogger::default();

    // 2 + floor(5 * 0.5) = 4
    let snapshot = trainer.run_iteration(&mut session, &mut logger).unwrap();
    assert_eq!(snapshot.dataset_trajectories, 4);
    assert_eq!(session.dataset().len(), 4);

    // 2 + floor(4 * 0.5) = 4
    trainer.run_iteration(&mut session, &mut logger).unwrap();
    assert_eq!(session.dataset().len(), 4);
    assert_eq!(session.iteration(), 2);
    assert_eq!(session.env_steps(), 30 + 2 * 2 * 6);
}

/// Test the default retention ratio of 1/9 on a small dataset.
#[test]
fn test_default_ratio_drops_small_old_dataset() {
    let mut trainer = trainer(quick_config());
    let mut session = trainer.bootstrap().unwrap();
    let mut logger = RecordingLogger::default();

    // floor(5 / 9) = 0 old trajectories survive.
    trainer.run_iteration(&mut session, &mut logger).unwrap();
    assert_eq!(session.dataset().len(), 2);
}

/// Test that a custom retention strategy is honored.
#[test]
fn test_retain_none_strategy() {
    let mut trainer = trainer(quick_config().with_retention_ratio(1.0))
        .with_retention_strategy(RetainNone)
        .unwrap();
    let mut session = trainer.bootstrap().unwrap();
    trainer
        .run_iteration(&mut session, &mut RecordingLogger::default())
        .unwrap();
    assert_eq!(session.dataset().len(), 2);
}

/// Test that the logger sees every iteration and is flushed each time.
/// INTENT: Metrics are durable at every iteration boundary.
#[test]
fn test_run_logs_every_iteration() {
    let mut trainer = trainer(quick_config().with_dagger_iters(3));
    let mut logger = RecordingLogger::default();

    let report = trainer.run(&mut logger).unwrap();

    assert_eq!(report.snapshots.len(), 3);
    assert_eq!(logger.snapshots.len(), 3);
    assert_eq!(logger.flushes, 3);
    for (i, snapshot) in logger.snapshots.iter().enumerate() {
        assert_eq!(snapshot.iteration, i);
        assert!(snapshot.model_loss.is_some());
        let names: Vec<&str> = snapshot.named_values().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, IterationSnapshot::METRIC_NAMES.to_vec());
    }
    assert_eq!(report.last(), logger.snapshots.last());
}

/// Test that reported returns come from the on-policy rollouts.
#[test]
fn test_snapshot_matches_rewards() {
    let mut trainer = trainer(quick_config());
    let mut session = trainer.bootstrap().unwrap();
    let snapshot = trainer
        .run_iteration(&mut session, &mut RecordingLogger::default())
        .unwrap();

    // Rewards are -s^2 and the cost is s'^2, so cost == -return per trajectory.
    assert!((snapshot.cost.mean + snapshot.returns.mean).abs() < 1e-3);
    assert!(snapshot.returns.max <= 0.0);
    assert!(snapshot.returns.min <= snapshot.returns.mean);
}

/// Test the opt-in normalization recompute.
#[test]
fn test_recompute_normalization_updates_stats() {
    let mut trainer = trainer(
        quick_config()
            .with_retention_ratio(1.0)
            .with_normalization_mode(NormalizationMode::RecomputeEachIteration),
    );
    let mut session = trainer.bootstrap().unwrap();
    let mut logger = RecordingLogger::default();

    trainer.run_iteration(&mut session, &mut logger).unwrap();
    let after_first = session.model().stats().clone();
    trainer.run_iteration(&mut session, &mut logger).unwrap();

    // Second iteration recomputed over bootstrap + on-policy data.
    assert_ne!(&after_first, session.model().stats());
}

/// Test that frozen statistics stay put.
#[test]
fn test_frozen_normalization_is_unchanged() {
    let mut trainer = trainer(quick_config().with_retention_ratio(1.0));
    let mut session = trainer.bootstrap().unwrap();
    let initial = session.model().stats().clone();

    trainer
        .run_iteration(&mut session, &mut RecordingLogger::default())
        .unwrap();
    assert_eq!(&initial, session.model().stats());
}

// ============================================================================
// Errors
// ============================================================================

/// Test that environment failures abort the iteration.
/// INTENT: No retries; the caller decides what to do.
#[test]
fn test_environment_failure_propagates() {
    let mut trainer = trainer(quick_config());
    let mut session = trainer.bootstrap().unwrap();
    trainer.env_mut().fail_after = Some(32);

    let mut logger = RecordingLogger::default();
    let err = trainer.run_iteration(&mut session, &mut logger).unwrap_err();
    assert!(matches!(err, MbrlError::Environment(_)));
    assert!(logger.snapshots.is_empty());
    assert_eq!(session.iteration(), 0);
}
