//! # Model-Based RL: Learned Dynamics + Random-Shooting MPC
//!
//! Learns an approximate transition function `f(s, a) ≈ s' - s` from
//! interaction data, plans with it by random-shooting model predictive
//! control, and improves it iteratively with on-policy data (DAgger-style
//! aggregation).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                        ModelBasedTrainer                             │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │   RandomController ──► Sampler ──► Dataset ──► NormalizationStats    │
//! │                           ▲           │                │             │
//! │                           │           ▼                ▼             │
//! │                           │     ┌──────────────────────────┐         │
//! │                           │     │ NnDynamicsModel (fit)    │         │
//! │                           │     │ Adam on normalized Δs    │         │
//! │                           │     └────────────┬─────────────┘         │
//! │                           │                  │ &model                │
//! │                           │                  ▼                       │
//! │                     MpcController ◄── CostFunction                   │
//! │                     N candidates × H steps, batched predict          │
//! │                           │                                          │
//! │                           ▼                                          │
//! │   AggregationBuffer: D ◄── new ∪ retain(D, floor(|D| · ratio))       │
//! │                           │                                          │
//! │                           ▼                                          │
//! │   IterationSnapshot ──► MetricsLogger (console / CSV)                │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on one thread. Batching over candidates is tensor math
//! on the Burn backend (`NdArray` on CPU, `wgpu` with the `wgpu` feature).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use model_based_rl::{ConsoleLogger, ModelBasedTrainer, QuadraticCost, TrainingConfig};
//!
//! type B = Autodiff<NdArray<f32>>;
//!
//! let config = TrainingConfig::new()
//!     .with_dagger_iters(5)
//!     .with_mpc_horizon(10);
//!
//! let mut trainer: ModelBasedTrainer<B, _, _> =
//!     ModelBasedTrainer::new(config, env, QuadraticCost::regulator(3, 1), Default::default())?;
//! let report = trainer.run(&mut ConsoleLogger::new())?;
//! ```

pub mod actors;
pub mod buffers;
pub mod controllers;
pub mod core;
pub mod cost;
pub mod dynamics;
pub mod environment;
pub mod metrics;
pub mod runners;

// Re-export commonly used types
pub use core::error::{MbrlError, Result};
pub use core::normalization::{MeanStd, NormalizationStats};
pub use core::running_stats::RunningMeanStd;
pub use core::transition::{Trajectory, Transition};

pub use actors::Sampler;
pub use buffers::{AggregationBuffer, Dataset, RetainNone, RetentionStrategy, UniformSubsample};
pub use controllers::{
    ActionSequences, MpcConfig, MpcController, PlanOutcome, Policy, RandomController, SimulatedRollouts,
};
pub use cost::{CostFunction, FnCost, QuadraticCost};
pub use dynamics::{
    Activation, DynamicsModel, DynamicsModelConfig, DynamicsNetwork, DynamicsNetworkConfig, FitReport,
    NnDynamicsModel,
};
pub use environment::{ActionSpace, EnvStep, Environment};
pub use metrics::{CSVLogger, ConsoleLogger, IterationSnapshot, MetricsLogger, MultiLogger, SummaryStats};
pub use runners::{ModelBasedTrainer, NormalizationMode, TrainingConfig, TrainingReport, TrainingSession};
