//! Configuration for model-based training.
//!
//! Every field has a default, and the struct deserializes with
//! `#[serde(default)]`, so a config file only needs the fields it changes:
//!
//! ```json
//! { "dagger_iters": 5, "mpc_horizon": 10, "num_simulated_paths": 500 }
//! ```

use serde::{Deserialize, Serialize};

use crate::buffers::DEFAULT_RETENTION_RATIO;
use crate::controllers::MpcConfig;
use crate::core::error::{MbrlError, Result};
use crate::dynamics::{Activation, DynamicsModelConfig};

/// When the normalization statistics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizationMode {
    /// Computed once from the random bootstrap data and never updated.
    #[default]
    FrozenAtStart,
    /// Recomputed from the aggregated dataset before every fit.
    ///
    /// Stats drift under the network between iterations, so earlier learned
    /// weights see shifted inputs. Opt in only when the state distribution
    /// visited by MPC moves far from the random bootstrap data.
    RecomputeEachIteration,
}

/// Training loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Adam learning rate for the dynamics model.
    pub learning_rate: f64,
    /// Number of aggregation iterations.
    pub dagger_iters: usize,
    /// Epochs over the dataset per model fit.
    pub dynamics_iters: usize,
    /// Minibatch size for model fitting.
    pub batch_size: usize,
    /// Random-policy rollouts used to bootstrap the dataset.
    pub num_random_rollouts: usize,
    /// MPC rollouts collected per iteration.
    pub num_onpol_rollouts: usize,
    /// Candidate sequences per MPC decision.
    pub num_simulated_paths: usize,
    /// Maximum steps per environment rollout.
    pub env_horizon: usize,
    /// Steps simulated per MPC candidate.
    pub mpc_horizon: usize,
    /// Hidden layers in the dynamics network.
    pub hidden_layers: usize,
    /// Units per hidden layer.
    pub hidden_units: usize,
    pub activation: Activation,
    pub output_activation: Activation,
    /// Master seed for every random stream in the run.
    pub seed: u64,
    /// Share of the old dataset kept on each aggregation.
    pub retention_ratio: f64,
    /// Optional cap on retained old trajectories.
    pub max_dataset_trajectories: Option<usize>,
    pub normalization_mode: NormalizationMode,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            dagger_iters: 10,
            dynamics_iters: 60,
            batch_size: 512,
            num_random_rollouts: 10,
            num_onpol_rollouts: 10,
            num_simulated_paths: 1000,
            env_horizon: 1000,
            mpc_horizon: 15,
            hidden_layers: 2,
            hidden_units: 500,
            activation: Activation::Relu,
            output_activation: Activation::Identity,
            seed: 3,
            retention_ratio: DEFAULT_RETENTION_RATIO,
            max_dataset_trajectories: None,
            normalization_mode: NormalizationMode::FrozenAtStart,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_dagger_iters(mut self, n: usize) -> Self {
        self.dagger_iters = n;
        self
    }

    pub fn with_dynamics_iters(mut self, n: usize) -> Self {
        self.dynamics_iters = n;
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_num_random_rollouts(mut self, n: usize) -> Self {
        self.num_random_rollouts = n;
        self
    }

    pub fn with_num_onpol_rollouts(mut self, n: usize) -> Self {
        self.num_onpol_rollouts = n;
        self
    }

    pub fn with_num_simulated_paths(mut self, n: usize) -> Self {
        self.num_simulated_paths = n;
        self
    }

    pub fn with_env_horizon(mut self, n: usize) -> Self {
        self.env_horizon = n;
        self
    }

    pub fn with_mpc_horizon(mut self, n: usize) -> Self {
        self.mpc_horizon = n;
        self
    }

    pub fn with_hidden_layers(mut self, n: usize) -> Self {
        self.hidden_layers = n;
        self
    }

    pub fn with_hidden_units(mut self, n: usize) -> Self {
        self.hidden_units = n;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_output_activation(mut self, activation: Activation) -> Self {
        self.output_activation = activation;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_retention_ratio(mut self, ratio: f64) -> Self {
        self.retention_ratio = ratio;
        self
    }

    pub fn with_max_dataset_trajectories(mut self, max: Option<usize>) -> Self {
        self.max_dataset_trajectories = max;
        self
    }

    pub fn with_normalization_mode(mut self, mode: NormalizationMode) -> Self {
        self.normalization_mode = mode;
        self
    }

    /// Dynamics model settings derived from this config.
    pub fn dynamics_config(&self) -> DynamicsModelConfig {
        DynamicsModelConfig::new()
            .with_hidden_layers(self.hidden_layers)
            .with_hidden_units(self.hidden_units)
            .with_activation(self.activation)
            .with_output_activation(self.output_activation)
            .with_learning_rate(self.learning_rate)
            .with_iterations(self.dynamics_iters)
            .with_batch_size(self.batch_size)
            .with_seed(self.seed)
    }

    /// Planner settings derived from this config.
    pub fn mpc_config(&self) -> MpcConfig {
        MpcConfig::new()
            .with_horizon(self.mpc_horizon)
            .with_num_simulated_paths(self.num_simulated_paths)
    }

    /// Reject configurations that would fail later in the run.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("dagger_iters", self.dagger_iters),
            ("num_random_rollouts", self.num_random_rollouts),
            ("num_onpol_rollouts", self.num_onpol_rollouts),
            ("env_horizon", self.env_horizon),
        ];
        for (param, value) in counts {
            if value == 0 {
                return Err(MbrlError::invalid_config(param, "must be > 0"));
            }
        }
        if !(0.0..=1.0).contains(&self.retention_ratio) {
            return Err(MbrlError::invalid_config(
                "retention_ratio",
                format!("must be in [0, 1], got {}", self.retention_ratio),
            ));
        }
        self.dynamics_config().validate()?;
        self.mpc_config().validate()?;
        Ok(())
    }

    /// Parse and validate JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MbrlError::invalid_config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
