//! Feed-forward network used as the dynamics function approximator.
//!
//! ```text
//! [s_norm | a_norm] ─► Linear ─► act ─► ... ─► Linear ─► out_act ─► Δs_norm
//!                      └──── hidden_layers × hidden_units ────┘
//! ```

use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{relu, tanh};
use serde::{Deserialize, Serialize};

use crate::core::error::{MbrlError, Result};

/// Elementwise activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    /// No activation.
    Identity,
}

impl Activation {
    /// Apply to a tensor.
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Relu => relu(x),
            Activation::Tanh => tanh(x),
            Activation::Identity => x,
        }
    }
}

/// Shape of the dynamics MLP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsNetworkConfig {
    /// state_dim + action_dim
    pub input_dim: usize,
    /// state_dim
    pub output_dim: usize,
    /// Number of hidden layers (0 gives a single linear map).
    pub hidden_layers: usize,
    /// Width of every hidden layer.
    pub hidden_units: usize,
    /// Activation after each hidden layer.
    pub activation: Activation,
    /// Activation on the output layer.
    pub output_activation: Activation,
}

impl DynamicsNetworkConfig {
    /// Two hidden layers of 500 ReLU units and a linear output.
    pub fn new(input_dim: usize, output_dim: usize) -> Self {
        Self {
            input_dim,
            output_dim,
            hidden_layers: 2,
            hidden_units: 500,
            activation: Activation::Relu,
            output_activation: Activation::Identity,
        }
    }

    /// Set number of hidden layers.
    pub fn with_hidden_layers(mut self, n: usize) -> Self {
        self.hidden_layers = n;
        self
    }

    /// Set hidden layer width.
    pub fn with_hidden_units(mut self, n: usize) -> Self {
        self.hidden_units = n;
        self
    }

    /// Set hidden activation.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Set output activation.
    pub fn with_output_activation(mut self, activation: Activation) -> Self {
        self.output_activation = activation;
        self
    }

    /// Check dimensions are usable.
    pub fn validate(&self) -> Result<()> {
        if self.input_dim == 0 {
            return Err(MbrlError::invalid_config("input_dim", "must be > 0"));
        }
        if self.output_dim == 0 {
            return Err(MbrlError::invalid_config("output_dim", "must be > 0"));
        }
        if self.hidden_layers > 0 && self.hidden_units == 0 {
            return Err(MbrlError::invalid_config("hidden_units", "must be > 0"));
        }
        Ok(())
    }

    /// Initialize the network on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> DynamicsNetwork<B> {
        let mut hidden = Vec::with_capacity(self.hidden_layers);
        let mut width = self.input_dim;
        for _ in 0..self.hidden_layers {
            hidden.push(LinearConfig::new(width, self.hidden_units).init(device));
            width = self.hidden_units;
        }

        DynamicsNetwork {
            hidden,
            output: LinearConfig::new(width, self.output_dim).init(device),
            activation: Ignored(self.activation),
            output_activation: Ignored(self.output_activation),
        }
    }
}

/// MLP mapping normalized `[state | action]` rows to normalized deltas.
#[derive(Module, Debug)]
pub struct DynamicsNetwork<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Ignored<Activation>,
    output_activation: Ignored<Activation>,
}

impl<B: Backend> DynamicsNetwork<B> {
    /// `[batch, input_dim]` -> `[batch, output_dim]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        for layer in &self.hidden {
            x = self.activation.apply(layer.forward(x));
        }
        self.output_activation.apply(self.output.forward(x))
    }

    /// Number of hidden layers.
    pub fn depth(&self) -> usize {
        self.hidden.len()
    }
}
