//! Action selection.
//!
//! | Controller         | Used for                                   |
//! |--------------------|--------------------------------------------|
//! | `RandomController` | bootstrap rollouts before any model exists |
//! | `MpcController`    | on-policy rollouts with the learned model  |

pub mod candidates;
pub mod mpc;
pub mod random;

pub use candidates::{ActionSequences, SimulatedRollouts};
pub use mpc::{MpcConfig, MpcController, PlanOutcome};
pub use random::RandomController;

use crate::core::error::Result;

/// Maps the current observation to an action.
pub trait Policy {
    fn get_action(&mut self, state: &[f32]) -> Result<Vec<f32>>;
}

impl<P: Policy + ?Sized> Policy for &mut P {
    fn get_action(&mut self, state: &[f32]) -> Result<Vec<f32>> {
        (**self).get_action(state)
    }
}
