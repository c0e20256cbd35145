//! Learned dynamics model `f(s, a) ≈ s' - s`.
//!
//! The network never sees raw values. Inputs are normalized with the state
//! and action statistics; the target is the normalized delta:
//!
//! ```text
//! fit:      loss = MSE( net([norm_s(s) | norm_a(a)]), norm_Δ(s' - s) )
//! predict:  s' = s + denorm_Δ( net([norm_s(s) | norm_a(a)]) )
//! ```
//!
//! Training runs on the autodiff backend `B`; prediction runs on a cached
//! copy of the network on `B::InnerBackend`, refreshed after every `fit`.

use burn::module::AutodiffModule;
use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::network::{Activation, DynamicsNetwork, DynamicsNetworkConfig};
use crate::buffers::{Dataset, FlatTransitions};
use crate::core::error::{MbrlError, Result};
use crate::core::normalization::NormalizationStats;

// ============================================================================
// Inference seam
// ============================================================================

/// Batched next-state predictor used by the planner.
pub trait DynamicsModel<B: Backend> {
    fn state_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// Device the model's tensors live on.
    fn device(&self) -> B::Device;

    /// Predict next states for `[batch, state_dim]` states and
    /// `[batch, action_dim]` actions. Returns `[batch, state_dim]`.
    fn predict_batch(&self, states: Tensor<B, 2>, actions: Tensor<B, 2>) -> Tensor<B, 2>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Network shape and training hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsModelConfig {
    pub hidden_layers: usize,
    pub hidden_units: usize,
    pub activation: Activation,
    pub output_activation: Activation,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Epochs over the dataset per `fit` call.
    pub iterations: usize,
    /// Minibatch size (clamped to the dataset size).
    pub batch_size: usize,
    /// Seed for minibatch shuffling.
    pub seed: u64,
}

impl Default for DynamicsModelConfig {
    fn default() -> Self {
        Self {
            hidden_layers: 2,
            hidden_units: 500,
            activation: Activation::Relu,
            output_activation: Activation::Identity,
            learning_rate: 1e-3,
            iterations: 60,
            batch_size: 512,
            seed: 0,
        }
    }
}

impl DynamicsModelConfig {
    pub fn new() -> Self {
        Self::default()
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

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Network configuration for the given dimensions.
    pub fn network_config(&self, state_dim: usize, action_dim: usize) -> DynamicsNetworkConfig {
        DynamicsNetworkConfig::new(state_dim + action_dim, state_dim)
            .with_hidden_layers(self.hidden_layers)
            .with_hidden_units(self.hidden_units)
            .with_activation(self.activation)
            .with_output_activation(self.output_activation)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(MbrlError::invalid_config("learning_rate", "must be finite and > 0"));
        }
        if self.iterations == 0 {
            return Err(MbrlError::invalid_config("dynamics_iters", "must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(MbrlError::invalid_config("batch_size", "must be > 0"));
        }
        if self.hidden_layers > 0 && self.hidden_units == 0 {
            return Err(MbrlError::invalid_config("hidden_units", "must be > 0"));
        }
        Ok(())
    }
}

/// Summary of one `fit` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub epochs: usize,
    /// Optimizer steps taken.
    pub updates: usize,
    /// Mean minibatch loss of the first epoch.
    pub first_epoch_loss: f32,
    /// Mean minibatch loss of the last epoch.
    pub final_epoch_loss: f32,
}

// ============================================================================
// Neural network dynamics model
// ============================================================================

/// MLP dynamics model trained with Adam on normalized deltas.
pub struct NnDynamicsModel<B: AutodiffBackend> {
    network: DynamicsNetwork<B>,
    inference: DynamicsNetwork<B::InnerBackend>,
    optimizer: OptimizerAdaptor<Adam, DynamicsNetwork<B>, B>,
    stats: NormalizationStats,
    config: DynamicsModelConfig,
    device: B::Device,
    rng: StdRng,
}

impl<B: AutodiffBackend> NnDynamicsModel<B> {
    /// Build an untrained model whose dimensions follow `stats`.
    pub fn new(config: DynamicsModelConfig, stats: NormalizationStats, device: &B::Device) -> Result<Self> {
        config.validate()?;
        let network_config = config.network_config(stats.state_dim(), stats.action_dim());
        network_config.validate()?;
        if !stats.all_std_positive() {
            return Err(MbrlError::invalid_config(
                "normalization",
                "standard deviations must be strictly positive",
            ));
        }

        let network: DynamicsNetwork<B> = network_config.init(device);
        let inference = network.valid();

        Ok(Self {
            network,
            inference,
            optimizer: AdamConfig::new().init(),
            rng: StdRng::seed_from_u64(config.seed),
            stats,
            config,
            device: device.clone(),
        })
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// Replace the normalization statistics. Dimensions must not change.
    pub fn set_stats(&mut self, stats: NormalizationStats) -> Result<()> {
        if stats.state_dim() != self.stats.state_dim() {
            return Err(MbrlError::dimension_mismatch(
                "state statistics",
                self.stats.state_dim(),
                stats.state_dim(),
            ));
        }
        if stats.action_dim() != self.stats.action_dim() {
            return Err(MbrlError::dimension_mismatch(
                "action statistics",
                self.stats.action_dim(),
                stats.action_dim(),
            ));
        }
        self.stats = stats;
        Ok(())
    }

    pub fn config(&self) -> &DynamicsModelConfig {
        &self.config
    }

    /// Fit on every transition of `dataset`.
    ///
    /// Runs `iterations` epochs of shuffled minibatch Adam steps on the MSE
    /// between predicted and true normalized deltas, then refreshes the
    /// inference network.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<FitReport> {
        let flat = dataset.flatten()?;
        self.check_dims(flat.state_dim, flat.action_dim)?;
        let normalized = self.normalize_flat(&flat);

        let batch_size = self.config.batch_size.min(flat.len);
        let lr = self.config.learning_rate;
        let mse = MseLoss::new();
        let mut indices: Vec<usize> = (0..flat.len).collect();

        let mut updates = 0;
        let mut first_epoch_loss = f32::NAN;
        let mut final_epoch_loss = f32::NAN;

        for epoch in 0..self.config.iterations {
            indices.shuffle(&mut self.rng);
            let mut loss_sum = 0.0f32;
            let mut batches = 0usize;

            for chunk in indices.chunks(batch_size) {
                let (states, actions, deltas) = normalized.gather(chunk);
                let n = chunk.len();

                let input = Tensor::cat(
                    vec![
                        Tensor::<B, 1>::from_floats(states.as_slice(), &self.device)
                            .reshape([n, flat.state_dim]),
                        Tensor::<B, 1>::from_floats(actions.as_slice(), &self.device)
                            .reshape([n, flat.action_dim]),
                    ],
                    1,
                );
                let target = Tensor::<B, 1>::from_floats(deltas.as_slice(), &self.device)
                    .reshape([n, flat.state_dim]);

                let prediction = self.network.forward(input);
                let loss = mse.forward(prediction, target, Reduction::Mean);
                let loss_value: f32 = loss.clone().into_scalar().elem();
                if !loss_value.is_finite() {
                    return Err(MbrlError::non_finite(format!(
                        "dynamics loss at epoch {}",
                        epoch
                    )));
                }

                let grads = GradientsParams::from_grads(loss.backward(), &self.network);
                self.network = self.optimizer.step(lr, self.network.clone(), grads);

                loss_sum += loss_value;
                batches += 1;
                updates += 1;
            }

            let epoch_loss = loss_sum / batches.max(1) as f32;
            if epoch == 0 {
                first_epoch_loss = epoch_loss;
            }
            final_epoch_loss = epoch_loss;
            log::debug!("dynamics epoch {}: loss {:.6}", epoch, epoch_loss);
        }

        self.inference = self.network.valid();

        Ok(FitReport {
            epochs: self.config.iterations,
            updates,
            first_epoch_loss,
            final_epoch_loss,
        })
    }

    /// Predict next states for a flat batch of rows.
    ///
    /// `states` is `[n * state_dim]`, `actions` is `[n * action_dim]`;
    /// the result is `[n * state_dim]`.
    pub fn predict(&self, states: &[f32], actions: &[f32]) -> Result<Vec<f32>> {
        let state_dim = self.stats.state_dim();
        let action_dim = self.stats.action_dim();
        if states.len() % state_dim != 0 {
            return Err(MbrlError::dimension_mismatch(
                "states length",
                states.len() - states.len() % state_dim,
                states.len(),
            ));
        }
        let n = states.len() / state_dim;
        if actions.len() != n * action_dim {
            return Err(MbrlError::dimension_mismatch("actions", n * action_dim, actions.len()));
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        let states = Tensor::<B::InnerBackend, 1>::from_floats(states, &self.device).reshape([n, state_dim]);
        let actions = Tensor::<B::InnerBackend, 1>::from_floats(actions, &self.device).reshape([n, action_dim]);

        let next: Vec<f32> = self
            .predict_batch(states, actions)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| MbrlError::Tensor(format!("{:?}", e)))?;

        if next.iter().any(|v| !v.is_finite()) {
            return Err(MbrlError::non_finite("dynamics prediction"));
        }
        Ok(next)
    }

    fn check_dims(&self, state_dim: usize, action_dim: usize) -> Result<()> {
        if state_dim != self.stats.state_dim() {
            return Err(MbrlError::dimension_mismatch("state", self.stats.state_dim(), state_dim));
        }
        if action_dim != self.stats.action_dim() {
            return Err(MbrlError::dimension_mismatch("action", self.stats.action_dim(), action_dim));
        }
        Ok(())
    }

    fn normalize_flat(&self, flat: &FlatTransitions) -> FlatTransitions {
        FlatTransitions {
            states: self.stats.state.normalize(&flat.states),
            actions: self.stats.action.normalize(&flat.actions),
            deltas: self.stats.delta.normalize(&flat.deltas),
            state_dim: flat.state_dim,
            action_dim: flat.action_dim,
            len: flat.len,
        }
    }
}

impl<B: AutodiffBackend> DynamicsModel<B::InnerBackend> for NnDynamicsModel<B> {
    fn state_dim(&self) -> usize {
        self.stats.state_dim()
    }

    fn action_dim(&self) -> usize {
        self.stats.action_dim()
    }

    fn device(&self) -> <B::InnerBackend as Backend>::Device {
        self.device.clone()
    }

    fn predict_batch(
        &self,
        states: Tensor<B::InnerBackend, 2>,
        actions: Tensor<B::InnerBackend, 2>,
    ) -> Tensor<B::InnerBackend, 2> {
        let input = Tensor::cat(
            vec![
                self.stats.state.normalize_tensor(states.clone()),
                self.stats.action.normalize_tensor(actions),
            ],
            1,
        );
        let delta = self.stats.delta.denormalize_tensor(self.inference.forward(input));
        states + delta
    }
}
