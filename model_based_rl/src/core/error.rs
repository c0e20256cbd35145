//! Error types for model-based training.
//!
//! Nothing in this crate retries. Every variant is fatal to the call that
//! produced it and recovery belongs to whoever drives the training run.

use std::fmt;

/// Result type for model-based RL operations.
pub type Result<T> = std::result::Result<T, MbrlError>;

/// Errors raised by the dynamics model, planner, sampler and training loop.
#[derive(Debug, Clone, PartialEq)]
pub enum MbrlError {
    /// Invalid configuration (zero horizon, degenerate action space, ...).
    InvalidConfig {
        param: String,
        message: String,
    },
    /// Normalization or fitting was asked to work on an empty dataset.
    EmptyDataset {
        context: String,
    },
    /// Vector or batch dimensions disagree with the model/environment.
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// The environment failed to reset or step.
    Environment(String),
    /// NaN or Inf appeared in a loss, prediction or candidate cost.
    NonFinite {
        context: String,
    },
    /// Tensor data could not be read back from the backend.
    Tensor(String),
}

impl MbrlError {
    /// Shorthand for [`MbrlError::InvalidConfig`].
    pub fn invalid_config(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Shorthand for [`MbrlError::DimensionMismatch`].
    pub fn dimension_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// Shorthand for [`MbrlError::EmptyDataset`].
    pub fn empty_dataset(context: impl Into<String>) -> Self {
        Self::EmptyDataset {
            context: context.into(),
        }
    }

    /// Shorthand for [`MbrlError::NonFinite`].
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFinite {
            context: context.into(),
        }
    }
}

impl fmt::Display for MbrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { param, message } => {
                write!(f, "Invalid configuration for '{}': {}", param, message)
            }
            Self::EmptyDataset { context } => write!(f, "Empty dataset: {}", context),
            Self::DimensionMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "Dimension mismatch for {}: expected {}, got {}",
                what, expected, actual
            ),
            Self::Environment(msg) => write!(f, "Environment error: {}", msg),
            Self::NonFinite { context } => write!(f, "Non-finite value in {}", context),
            Self::Tensor(msg) => write!(f, "Tensor error: {}", msg),
        }
    }
}

impl std::error::Error for MbrlError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_config() {
        let err = MbrlError::invalid_config("mpc_horizon", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'mpc_horizon': must be at least 1"
        );
    }

    #[test]
    fn test_display_dimension_mismatch() {
        let err = MbrlError::dimension_mismatch("action", 2, 3);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch for action: expected 2, got 3"
        );
    }

    #[test]
    fn test_is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&MbrlError::Environment("boom".into()));
    }
}
