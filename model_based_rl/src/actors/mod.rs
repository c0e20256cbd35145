//! Experience collection.
//!
//! - `Sampler`: runs any `Policy` in an `Environment` for a fixed number of
//!   bounded rollouts

pub mod sampler;

pub use sampler::Sampler;
