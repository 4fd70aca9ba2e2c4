//! LSTM network configuration

use super::layers::Activation;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Architecture of a stacked LSTM forecaster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LSTMConfig {
    /// Number of features per time step
    pub input_size: usize,
    /// Number of time steps per input window
    pub sequence_length: usize,
    /// Hidden size of each LSTM layer, bottom to top
    pub hidden_sizes: Vec<usize>,
    /// Activation of the cell candidate and hidden output (Keras `activation`)
    #[serde(default = "default_cell_activation")]
    pub cell_activation: Activation,
    /// Number of outputs of the dense head
    pub output_size: usize,
    /// Weight initialization for randomly built networks
    #[serde(default)]
    pub weight_init: WeightInit,
}

fn default_cell_activation() -> Activation {
    Activation::Tanh
}

/// Weight initialization scheme
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum WeightInit {
    /// Uniform in `±sqrt(1 / hidden_size)`
    #[default]
    Xavier,
    /// Uniform in `[low, high)`
    Uniform { low: f64, high: f64 },
}

impl WeightInit {
    /// Sampling bounds for a layer of the given hidden size
    pub fn bounds(&self, hidden_size: usize) -> (f64, f64) {
        match *self {
            WeightInit::Xavier => {
                let limit = (1.0 / hidden_size.max(1) as f64).sqrt();
                (-limit, limit)
            }
            WeightInit::Uniform { low, high } => (low, high),
        }
    }
}

impl LSTMConfig {
    /// Single-layer network with one output
    ///
    /// # Arguments
    ///
    /// * `input_size` - Features per time step
    /// * `sequence_length` - Window length the network expects
    /// * `hidden_size` - Hidden size of the LSTM layer
    pub fn new(input_size: usize, sequence_length: usize, hidden_size: usize) -> Self {
        Self {
            input_size,
            sequence_length,
            hidden_sizes: vec![hidden_size],
            cell_activation: Activation::Tanh,
            output_size: 1,
            weight_init: WeightInit::Xavier,
        }
    }

    /// Repeat the first hidden size over `num_layers` layers
    pub fn with_layers(mut self, num_layers: usize) -> Self {
        let hidden = self.hidden_sizes.first().copied().unwrap_or(1);
        self.hidden_sizes = vec![hidden; num_layers.max(1)];
        self
    }

    /// Set per-layer hidden sizes
    pub fn with_hidden_sizes(mut self, hidden_sizes: Vec<usize>) -> Self {
        self.hidden_sizes = hidden_sizes;
        self
    }

    /// Set the cell activation
    pub fn with_cell_activation(mut self, activation: Activation) -> Self {
        self.cell_activation = activation;
        self
    }

    /// Set the weight initialization
    pub fn with_weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    /// Number of LSTM layers
    pub fn num_layers(&self) -> usize {
        self.hidden_sizes.len()
    }

    /// Check that every size is positive and the weight init bounds form an
    /// interval
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 || self.sequence_length == 0 {
            return Err(Error::Config(format!(
                "input size ({}) and sequence length ({}) must be positive",
                self.input_size, self.sequence_length
            )));
        }
        if self.hidden_sizes.is_empty() || self.hidden_sizes.contains(&0) {
            return Err(Error::Config(format!(
                "hidden sizes must be non-empty and positive, got {:?}",
                self.hidden_sizes
            )));
        }
        if self.output_size == 0 {
            return Err(Error::Config("output size must be positive".to_string()));
        }
        if let WeightInit::Uniform { low, high } = self.weight_init {
            if !(low.is_finite() && high.is_finite() && low < high) {
                return Err(Error::Config(format!(
                    "uniform init needs finite low < high, got [{}, {})",
                    low, high
                )));
            }
        }
        Ok(())
    }

    /// Small single-layer network
    pub fn small(sequence_length: usize) -> Self {
        Self::new(1, sequence_length, 32)
    }

    /// Two layers of 64 units
    pub fn medium(sequence_length: usize) -> Self {
        Self::new(1, sequence_length, 64).with_layers(2)
    }

    /// The classic four-layer daily close forecaster (50-60-80-120, ReLU cells)
    pub fn large(sequence_length: usize) -> Self {
        Self::new(1, sequence_length, 50)
            .with_hidden_sizes(vec![50, 60, 80, 120])
            .with_cell_activation(Activation::Relu)
    }
}

impl Default for LSTMConfig {
    fn default() -> Self {
        Self::large(crate::config::DEFAULT_LOOKBACK)
    }
}
