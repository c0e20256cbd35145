//! Training runners.
//!
//! - [`ModelBasedTrainer`]: bootstrap plus fit / plan / aggregate iterations
//! - [`TrainingConfig`]: every tunable of a run, serde-loadable

pub mod config;
pub mod trainer;

pub use config::{NormalizationMode, TrainingConfig};
pub use trainer::{ModelBasedTrainer, TrainingReport, TrainingSession};

#[cfg(test)]
mod tests;
