//! # Models
//!
//! The pipeline talks to models only through the [`Predictor`] trait: a pure
//! function from a window batch `[batch, sequence_length, features]` to one
//! scalar per window.
//!
//! - `LstmPredictor` - pretrained stacked LSTM loaded from the model store
//! - `NaivePredictor` - persistence baseline (tomorrow equals today)
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array3;
//! use stock_trend_forecast::model::{LSTMConfig, LstmPredictor, Predictor};
//!
//! let model = LstmPredictor::random(LSTMConfig::new(1, 10, 8), 42);
//! let batch = Array3::<f64>::zeros((4, 10, 1));
//! let forecasts = model.predict(&batch).unwrap();
//! assert_eq!(forecasts.len(), 4);
//! ```

mod config;
mod layers;
mod lstm;
pub mod store;

pub use config::{LSTMConfig, WeightInit};
pub use layers::{Activation, Dense};
pub use lstm::{LSTMCell, LstmPredictor};
pub use store::ModelFormat;

use crate::error::{Error, Result};
use ndarray::{Array1, Array3, Axis};

/// A pretrained sequence model
pub trait Predictor {
    /// `(sequence_length, features)` the model was built for
    fn input_shape(&self) -> (usize, usize);

    /// One forecast per window, in input order.
    ///
    /// Must not depend on anything but `batch`. `ForecastPipeline` runs
    /// [`Predictor::check_shape`] before every call; window contents are not
    /// validated.
    fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>>;

    /// Short name for logs
    fn name(&self) -> &str {
        "predictor"
    }

    /// Fail with [`Error::ShapeMismatch`] unless `batch` is `[_, L, F]` with
    /// `(L, F) == input_shape()`
    fn check_shape(&self, batch: &Array3<f64>) -> Result<()> {
        let expected = self.input_shape();
        let actual = (batch.shape()[1], batch.shape()[2]);
        if expected != actual {
            return Err(Error::ShapeMismatch { expected, actual });
        }
        Ok(())
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn input_shape(&self) -> (usize, usize) {
        (**self).input_shape()
    }

    fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>> {
        (**self).predict(batch)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn input_shape(&self) -> (usize, usize) {
        (**self).input_shape()
    }

    fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>> {
        (**self).predict(batch)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Persistence baseline: forecasts the last value of each window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaivePredictor {
    sequence_length: usize,
}

impl NaivePredictor {
    /// Baseline for windows of the given length
    pub fn new(sequence_length: usize) -> Self {
        Self { sequence_length }
    }
}

impl Predictor for NaivePredictor {
    fn input_shape(&self) -> (usize, usize) {
        (self.sequence_length, 1)
    }

    fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>> {
        self.check_shape(batch)?;
        let last = self.sequence_length.saturating_sub(1);
        Ok(batch
            .index_axis(Axis(1), last)
            .index_axis(Axis(1), 0)
            .to_owned())
    }

    fn name(&self) -> &str {
        "naive"
    }
}
