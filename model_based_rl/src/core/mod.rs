//! Core types shared by every component.

pub mod error;
pub mod normalization;
pub mod running_stats;
pub mod transition;

pub use error::{MbrlError, Result};
pub use normalization::{MeanStd, NormalizationStats, DEFAULT_STD_EPSILON};
pub use running_stats::RunningMeanStd;
pub use transition::{Trajectory, Transition};
