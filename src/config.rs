//! Pipeline configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of prior steps fed to the model per prediction
pub const DEFAULT_LOOKBACK: usize = 100;

/// Default share of the series used to fit the scaler
pub const DEFAULT_SPLIT_FRACTION: f64 = 0.75;

/// Default number of windows handed to the predictor per call
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Configuration of the forecasting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Lookback length L (window size)
    pub lookback: usize,
    /// Fraction of the series assigned to the fit segment, in (0, 1)
    pub split_fraction: f64,
    /// Target range of the min-max normalization
    pub feature_range: (f64, f64),
    /// Maximum number of windows materialized per predictor call
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            split_fraction: DEFAULT_SPLIT_FRACTION,
            feature_range: (0.0, 1.0),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lookback length
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Set the split fraction
    pub fn with_split_fraction(mut self, split_fraction: f64) -> Self {
        self.split_fraction = split_fraction;
        self
    }

    /// Set the normalization target range
    pub fn with_feature_range(mut self, low: f64, high: f64) -> Self {
        self.feature_range = (low, high);
        self
    }

    /// Set the predictor batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(Error::Config("lookback must be at least 1".to_string()));
        }

        if !(self.split_fraction > 0.0 && self.split_fraction < 1.0) {
            return Err(Error::Config(format!(
                "split fraction must lie in (0, 1), got {}",
                self.split_fraction
            )));
        }

        let (low, high) = self.feature_range;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::Config(format!(
                "feature range must be a finite interval with low < high, got ({}, {})",
                low, high
            )));
        }

        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = crate::utils::load_json(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::utils::save_json(self, path)
    }
}
