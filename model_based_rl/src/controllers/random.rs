//! Uniform random controller used to bootstrap the dataset.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::Policy;
use crate::core::error::Result;
use crate::environment::ActionSpace;

/// Ignores the state and samples uniformly from the action space.
#[derive(Debug, Clone)]
pub struct RandomController {
    action_space: ActionSpace,
    rng: StdRng,
}

impl RandomController {
    pub fn new(action_space: ActionSpace, seed: u64) -> Self {
        Self {
            action_space,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomController {
    fn get_action(&mut self, _state: &[f32]) -> Result<Vec<f32>> {
        Ok(self.action_space.sample(&mut self.rng))
    }
}
