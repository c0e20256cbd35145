//! Test suite for the training runners.
//!
//! # Test Organization
//!
//! - `config_tests`: defaults, builders, validation and JSON loading
//! - `trainer_tests`: bootstrap, iteration bookkeeping, aggregation sizes,
//!   logger calls, error propagation
//! - `end_to_end_tests`: a 1-D linear system where the learned planner must
//!   beat a do-nothing baseline
//!
//! # Shared fixtures
//!
//! [`LinearEnv`] is `s' = s + a` with reward `-s'^2`, action bounds `[-1, 1]`
//! and start states drawn uniformly from `[-2, 2]`.

pub mod end_to_end_tests;
pub mod trainer_tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::error::{MbrlError, Result};
use crate::environment::{ActionSpace, EnvStep, Environment};
use crate::metrics::{IterationSnapshot, MetricsLogger};

/// One-dimensional integrator.
pub struct LinearEnv {
    space: ActionSpace,
    state: f32,
    rng: StdRng,
    /// Fail on this many total `step` calls, if set.
    pub fail_after: Option<usize>,
    steps: usize,
}

impl LinearEnv {
    pub fn new(seed: u64) -> Self {
        Self {
            space: ActionSpace::uniform(1, -1.0, 1.0).unwrap(),
            state: 0.0,
            rng: StdRng::seed_from_u64(seed),
            fail_after: None,
            steps: 0,
        }
    }
}

impl Environment for LinearEnv {
    fn observation_size(&self) -> usize {
        1
    }

    fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    fn reset(&mut self) -> Result<Vec<f32>> {
        self.state = self.rng.gen_range(-2.0..=2.0);
        Ok(vec![self.state])
    }

    fn step(&mut self, action: &[f32]) -> Result<EnvStep> {
        if self.fail_after == Some(self.steps) {
            return Err(MbrlError::Environment("integrator diverged".into()));
        }
        self.steps += 1;
        self.state += action[0].clamp(-1.0, 1.0);
        Ok(EnvStep::new(vec![self.state], -self.state * self.state, false))
    }
}

/// Logger that keeps every snapshot and counts flushes.
#[derive(Default)]
pub struct RecordingLogger {
    pub snapshots: Vec<IterationSnapshot>,
    pub flushes: usize,
}

impl MetricsLogger for RecordingLogger {
    fn log(&mut self, snapshot: &IterationSnapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
