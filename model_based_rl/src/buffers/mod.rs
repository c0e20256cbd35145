//! Training data storage.
//!
//! - `Dataset`: every trajectory the dynamics model is fit on
//! - `AggregationBuffer`: merges fresh on-policy data with a retained share of
//!   the previous dataset

pub mod aggregation;
pub mod dataset;

pub use aggregation::{
    AggregationBuffer, RetainNone, RetentionStrategy, UniformSubsample, DEFAULT_RETENTION_RATIO,
};
pub use dataset::{Dataset, FlatTransitions};

#[cfg(test)]
mod tests;
