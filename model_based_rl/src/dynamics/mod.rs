//! Learned dynamics.
//!
//! - `DynamicsNetwork`: MLP over normalized `[state | action]`
//! - `NnDynamicsModel`: normalization, Adam fitting and batched prediction
//! - `DynamicsModel`: the inference trait the planner depends on

pub mod model;
pub mod network;

pub use model::{DynamicsModel, DynamicsModelConfig, FitReport, NnDynamicsModel};
pub use network::{Activation, DynamicsNetwork, DynamicsNetworkConfig};
