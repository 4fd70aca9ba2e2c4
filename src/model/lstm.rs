//! Stacked LSTM forecaster (inference only)
//!
//! Gates follow the usual formulation:
//!
//! ```text
//! i = σ(W_ii x + W_hi h + b_i)
//! f = σ(W_if x + W_hf h + b_f)
//! g = act(W_ig x + W_hg h + b_g)
//! o = σ(W_io x + W_ho h + b_o)
//! c' = f * c + i * g
//! h' = o * act(c')
//! ```
//!
//! where `act` is the configured cell activation (tanh unless the network was
//! trained with something else). The last hidden state of the top layer goes
//! through a dense head producing the forecast.

use super::config::LSTMConfig;
use super::layers::{Activation, Dense};
use super::store::{self, ModelFormat};
use super::Predictor;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2, Array3, ArrayView2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Weights of one LSTM layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LSTMCell {
    /// Input size
    pub input_size: usize,
    /// Hidden state size
    pub hidden_size: usize,

    // Input gate
    w_ii: Array2<f64>,
    w_hi: Array2<f64>,
    b_i: Array1<f64>,

    // Forget gate
    w_if: Array2<f64>,
    w_hf: Array2<f64>,
    b_f: Array1<f64>,

    // Cell candidate
    w_ig: Array2<f64>,
    w_hg: Array2<f64>,
    b_g: Array1<f64>,

    // Output gate
    w_io: Array2<f64>,
    w_ho: Array2<f64>,
    b_o: Array1<f64>,
}

impl LSTMCell {
    /// Cell with weights drawn uniformly from `[low, high)`
    pub fn random<R: Rng>(
        input_size: usize,
        hidden_size: usize,
        bounds: (f64, f64),
        rng: &mut R,
    ) -> Self {
        let dist = Uniform::new(bounds.0, bounds.1);
        let input_shape = (hidden_size, input_size);
        let recurrent_shape = (hidden_size, hidden_size);

        let w_ii = Array2::random_using(input_shape, dist, rng);
        let w_hi = Array2::random_using(recurrent_shape, dist, rng);
        let w_if = Array2::random_using(input_shape, dist, rng);
        let w_hf = Array2::random_using(recurrent_shape, dist, rng);
        let w_ig = Array2::random_using(input_shape, dist, rng);
        let w_hg = Array2::random_using(recurrent_shape, dist, rng);
        let w_io = Array2::random_using(input_shape, dist, rng);
        let w_ho = Array2::random_using(recurrent_shape, dist, rng);

        Self {
            input_size,
            hidden_size,
            w_ii,
            w_hi,
            b_i: Array1::zeros(hidden_size),
            w_if,
            w_hf,
            // forget bias starts at 1
            b_f: Array1::from_elem(hidden_size, 1.0),
            w_ig,
            w_hg,
            b_g: Array1::zeros(hidden_size),
            w_io,
            w_ho,
            b_o: Array1::zeros(hidden_size),
        }
    }

    /// Check that every weight matrix matches the declared sizes
    fn validate(&self) -> std::result::Result<(), String> {
        let input_shape = [self.hidden_size, self.input_size];
        let recurrent_shape = [self.hidden_size, self.hidden_size];

        let inputs = [&self.w_ii, &self.w_if, &self.w_ig, &self.w_io];
        let recurrents = [&self.w_hi, &self.w_hf, &self.w_hg, &self.w_ho];
        let biases = [&self.b_i, &self.b_f, &self.b_g, &self.b_o];

        if inputs.iter().any(|w| w.shape() != input_shape) {
            return Err(format!("input weights must be {:?}", input_shape));
        }
        if recurrents.iter().any(|w| w.shape() != recurrent_shape) {
            return Err(format!("recurrent weights must be {:?}", recurrent_shape));
        }
        if biases.iter().any(|b| b.len() != self.hidden_size) {
            return Err(format!("biases must have length {}", self.hidden_size));
        }
        Ok(())
    }

    /// One time step
    ///
    /// # Arguments
    ///
    /// * `x` - Input vector [input_size]
    /// * `h_prev` - Previous hidden state [hidden_size]
    /// * `c_prev` - Previous cell state [hidden_size]
    /// * `activation` - Candidate / output activation
    ///
    /// # Returns
    ///
    /// (h_next, c_next)
    pub fn forward(
        &self,
        x: &Array1<f64>,
        h_prev: &Array1<f64>,
        c_prev: &Array1<f64>,
        activation: Activation,
    ) -> (Array1<f64>, Array1<f64>) {
        let sigmoid = Activation::Sigmoid;

        let i_gate = sigmoid.apply_array(&(self.w_ii.dot(x) + self.w_hi.dot(h_prev) + &self.b_i));
        let f_gate = sigmoid.apply_array(&(self.w_if.dot(x) + self.w_hf.dot(h_prev) + &self.b_f));
        let g = activation.apply_array(&(self.w_ig.dot(x) + self.w_hg.dot(h_prev) + &self.b_g));
        let o_gate = sigmoid.apply_array(&(self.w_io.dot(x) + self.w_ho.dot(h_prev) + &self.b_o));

        let c_next = &f_gate * c_prev + &i_gate * &g;
        let h_next = &o_gate * &activation.apply_array(&c_next);

        (h_next, c_next)
    }

    /// Zero hidden and cell state
    pub fn init_hidden(&self) -> (Array1<f64>, Array1<f64>) {
        (
            Array1::zeros(self.hidden_size),
            Array1::zeros(self.hidden_size),
        )
    }
}

/// Pretrained stacked LSTM with a dense head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmPredictor {
    /// Network architecture
    pub config: LSTMConfig,
    cells: Vec<LSTMCell>,
    head: Dense,
}

impl LstmPredictor {
    /// Randomly initialized network, reproducible from `seed`.
    ///
    /// Useful for demos and tests; real forecasts need trained weights from
    /// [`LstmPredictor::load`].
    ///
    /// # Panics
    ///
    /// If `config` has `WeightInit::Uniform` bounds with `low >= high`; check
    /// with [`LSTMConfig::validate`] first when the config comes from outside.
    pub fn random(config: LSTMConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut cells = Vec::with_capacity(config.num_layers());
        let mut input_size = config.input_size;
        for &hidden in &config.hidden_sizes {
            let bounds = config.weight_init.bounds(hidden);
            cells.push(LSTMCell::random(input_size, hidden, bounds, &mut rng));
            input_size = hidden;
        }

        let head = Dense::random(input_size, config.output_size, Activation::Linear, &mut rng);

        Self { config, cells, head }
    }

    /// Assemble a network from trained layers
    pub fn from_parts(config: LSTMConfig, cells: Vec<LSTMCell>, head: Dense) -> Result<Self> {
        let model = Self { config, cells, head };
        model
            .validate()
            .map_err(|reason| Error::Config(format!("inconsistent LSTM weights: {}", reason)))?;
        Ok(model)
    }

    /// Load trained weights. `.json` files are read as JSON, anything else as bincode.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model: Self = store::load(path)?;

        model.validate().map_err(|reason| Error::ModelLoad {
            path: path.display().to_string(),
            reason,
        })?;

        info!(
            "Loaded LSTM from {} ({} layers, window {})",
            path.display(),
            model.cells.len(),
            model.config.sequence_length
        );
        Ok(model)
    }

    /// Save the network in the format implied by the file extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        store::save(self, path, ModelFormat::from_path(path))
    }

    /// Number of LSTM layers
    pub fn num_layers(&self) -> usize {
        self.cells.len()
    }

    /// Total number of trainable parameters
    pub fn num_parameters(&self) -> usize {
        let cells: usize = self
            .cells
            .iter()
            .map(|c| 4 * (c.hidden_size * c.input_size + c.hidden_size * c.hidden_size + c.hidden_size))
            .sum();
        cells + self.head.weights.len() + self.head.biases.len()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        self.config.validate().map_err(|e| e.to_string())?;
        if self.cells.is_empty() {
            return Err("network has no LSTM layers".to_string());
        }
        if self.cells.len() != self.config.hidden_sizes.len() {
            return Err(format!(
                "config declares {} layers, found {}",
                self.config.hidden_sizes.len(),
                self.cells.len()
            ));
        }

        let mut expected_input = self.config.input_size;
        for (layer, (cell, &hidden)) in self.cells.iter().zip(&self.config.hidden_sizes).enumerate() {
            if cell.input_size != expected_input || cell.hidden_size != hidden {
                return Err(format!(
                    "layer {} is {}x{}, expected {}x{}",
                    layer, cell.input_size, cell.hidden_size, expected_input, hidden
                ));
            }
            cell.validate().map_err(|e| format!("layer {}: {}", layer, e))?;
            expected_input = hidden;
        }

        if self.head.input_size() != expected_input
            || self.head.output_size() != self.config.output_size
            || self.head.biases.len() != self.config.output_size
        {
            return Err(format!(
                "dense head must be {}x{}",
                self.config.output_size, expected_input
            ));
        }
        Ok(())
    }

    /// Run one window `[seq_len, input_size]` through the network
    fn forward_window(&self, window: ArrayView2<f64>) -> f64 {
        let activation = self.config.cell_activation;
        let mut states: Vec<(Array1<f64>, Array1<f64>)> =
            self.cells.iter().map(|cell| cell.init_hidden()).collect();

        for step in window.axis_iter(Axis(0)) {
            let mut layer_input = step.to_owned();

            for (cell, state) in self.cells.iter().zip(states.iter_mut()) {
                let (h_next, c_next) = cell.forward(&layer_input, &state.0, &state.1, activation);
                layer_input = h_next.clone();
                *state = (h_next, c_next);
            }
        }

        match states.last() {
            Some((final_hidden, _)) => self
                .head
                .forward(final_hidden)
                .get(0)
                .copied()
                .unwrap_or(f64::NAN),
            None => f64::NAN,
        }
    }
}

impl Predictor for LstmPredictor {
    fn input_shape(&self) -> (usize, usize) {
        (self.config.sequence_length, self.config.input_size)
    }

    fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>> {
        self.check_shape(batch)?;
        if self.cells.is_empty() {
            return Err(Error::Config("network has no LSTM layers".to_string()));
        }

        let outputs: Vec<f64> = (0..batch.shape()[0])
            .into_par_iter()
            .map(|b| self.forward_window(batch.index_axis(Axis(0), b)))
            .collect();

        Ok(Array1::from(outputs))
    }

    fn name(&self) -> &str {
        "lstm"
    }
}
