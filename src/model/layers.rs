//! Dense output layer and activation functions

use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Activation {
    /// Apply to a single value
    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
        }
    }

    /// Apply elementwise
    pub fn apply_array(&self, x: &Array1<f64>) -> Array1<f64> {
        x.mapv(|v| self.apply(v))
    }
}

/// Fully connected layer: `activation(W x + b)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    /// Weights `[output_size, input_size]`
    pub weights: Array2<f64>,
    /// Biases `[output_size]`
    pub biases: Array1<f64>,
    /// Output activation
    #[serde(default)]
    pub activation: Activation,
}

impl Dense {
    /// Layer with uniformly initialized weights and zero biases
    pub fn random<R: Rng>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (input_size + output_size).max(1) as f64).sqrt();
        Self {
            weights: Array2::random_using(
                (output_size, input_size),
                Uniform::new(-limit, limit),
                rng,
            ),
            biases: Array1::zeros(output_size),
            activation,
        }
    }

    /// Layer from explicit parameters
    pub fn from_weights(weights: Array2<f64>, biases: Array1<f64>, activation: Activation) -> Self {
        Self {
            weights,
            biases,
            activation,
        }
    }

    /// Number of inputs
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Forward pass for one input vector
    pub fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.activation
            .apply_array(&(self.weights.dot(x) + &self.biases))
    }
}
