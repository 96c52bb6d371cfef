use std::{fmt, str::FromStr};

use burn::{
    module::Ignored,
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation,
};
use serde::{Deserialize, Serialize};

/// Non-linearity applied between hidden layers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Activation {
    #[default]
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::Relu => activation::relu(x),
            Activation::Sigmoid => activation::sigmoid(x),
            Activation::Tanh => activation::tanh(x),
        }
    }
}

impl FromStr for Activation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relu" => Ok(Activation::Relu),
            "sigmoid" => Ok(Activation::Sigmoid),
            "tanh" => Ok(Activation::Tanh),
            other => anyhow::bail!("unknown activation '{other}' (expected relu, sigmoid or tanh)"),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Relu => "relu",
            Activation::Sigmoid => "sigmoid",
            Activation::Tanh => "tanh",
        };
        f.write_str(name)
    }
}

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct ClassifierConfig {
    pub input_size:   usize,
    pub num_classes:  usize,
    #[config(default = "vec![128, 64]")]
    pub hidden_sizes: Vec<usize>,
    #[config(default = "Activation::Relu")]
    pub activation:   Activation,
}

impl ClassifierConfig {
    /// Widths of every layer boundary, input first and classes last.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_sizes.len() + 2);
        sizes.push(self.input_size);
        sizes.extend_from_slice(&self.hidden_sizes);
        sizes.push(self.num_classes);
        sizes
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Classifier<B> {
        let layers: Vec<Linear<B>> = self
            .layer_sizes()
            .windows(2)
            .map(|w| LinearConfig::new(w[0], w[1]).init(device))
            .collect();
        Classifier { layers, activation: Ignored(self.activation) }
    }
}

/// A stack of fully connected layers.
///
/// The activation sits between layers only; the last layer emits raw logits.
#[derive(Module, Debug)]
pub struct Classifier<B: Backend> {
    pub layers:     Vec<Linear<B>>,
    pub activation: Ignored<Activation>,
}

impl<B: Backend> Classifier<B> {
    /// images: [batch, input_size] → logits: [batch, num_classes]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let last = self.layers.len().saturating_sub(1);
        let mut x = images;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);
            if i < last {
                x = self.activation.0.apply(x);
            }
        }
        x
    }

    /// Log-softmax over the class dimension.
    pub fn log_probabilities(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::log_softmax(self.forward(images), 1)
    }

    /// Softmax over the class dimension; each row sums to 1.
    pub fn probabilities(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        activation::softmax(self.forward(images), 1)
    }
}
