//! Min-max scaling fitted on the fit segment
//!
//! `MinMaxScaler::fit` produces an immutable [`ScalerParams`]. The inverse
//! transform is derived from the same parameters, so forecasts and ground truth
//! are always denormalized identically.

use crate::error::{Error, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fitted min-max parameters.
///
/// `normalized = (raw - min) * scale + low` and
/// `raw = (normalized - low) / scale + min`, where
/// `scale = (high - low) / (max - min)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    data_min: f64,
    data_max: f64,
    scale: f64,
    feature_range: (f64, f64),
}

impl ScalerParams {
    /// Minimum of the fit data
    pub fn min(&self) -> f64 {
        self.data_min
    }

    /// Maximum of the fit data
    pub fn max(&self) -> f64 {
        self.data_max
    }

    /// Multiplicative factor of the forward transform
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Target range of the forward transform
    pub fn feature_range(&self) -> (f64, f64) {
        self.feature_range
    }

    /// Normalize one value
    #[inline]
    pub fn forward_value(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale + self.feature_range.0
    }

    /// Denormalize one value
    #[inline]
    pub fn inverse_value(&self, value: f64) -> f64 {
        (value - self.feature_range.0) / self.scale + self.data_min
    }

    /// Normalize a sequence elementwise
    pub fn forward(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.forward_value(v)).collect()
    }

    /// Denormalize a sequence elementwise
    pub fn inverse(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.inverse_value(v)).collect()
    }

    /// Denormalize an array elementwise
    pub fn inverse_array(&self, values: &Array1<f64>) -> Array1<f64> {
        values.mapv(|v| self.inverse_value(v))
    }
}

/// Min-max scaler configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self {
            feature_range: (0.0, 1.0),
        }
    }
}

impl MinMaxScaler {
    /// Scaler mapping the fit range onto `[0, 1]`
    pub fn new() -> Self {
        Self::default()
    }

    /// Scaler mapping the fit range onto `[low, high]`
    pub fn with_range(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::Config(format!(
                "invalid feature range ({}, {})",
                low, high
            )));
        }
        Ok(Self {
            feature_range: (low, high),
        })
    }

    /// Fit parameters on the given values.
    ///
    /// NaN values are ignored when taking the extremes.
    pub fn fit(&self, values: &[f64]) -> Result<ScalerParams> {
        if values.is_empty() {
            return Err(Error::InputData(
                "cannot fit scaler on an empty segment".to_string(),
            ));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if !min.is_finite() || !max.is_finite() || max <= min {
            return Err(Error::DegenerateRange { min, max });
        }

        let (low, high) = self.feature_range;
        Ok(ScalerParams {
            data_min: min,
            data_max: max,
            scale: (high - low) / (max - min),
            feature_range: self.feature_range,
        })
    }
}
