//! Denormalization of predictions and targets

use super::scaler::ScalerParams;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One forecast aligned with its ground truth, in original price units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Timestamp of the observation the target was taken from
    pub timestamp: DateTime<Utc>,
    /// Ground-truth price
    pub actual: f64,
    /// Forecast price
    pub predicted: f64,
}

impl ForecastPoint {
    /// Signed forecast error (`predicted - actual`)
    pub fn error(&self) -> f64 {
        self.predicted - self.actual
    }
}

/// Applies the inverse of a fitted scaler to model outputs and targets
#[derive(Debug, Clone, Copy)]
pub struct Rescaler {
    params: ScalerParams,
}

impl Rescaler {
    /// Rescaler for the parameters fitted on the fit segment
    pub fn new(params: ScalerParams) -> Self {
        Self { params }
    }

    /// Parameters used for the inverse transform
    pub fn params(&self) -> &ScalerParams {
        &self.params
    }

    /// Denormalize predictions and targets with the same parameters.
    ///
    /// Returns `(predicted, actual)` in original units, position for position.
    pub fn rescale(
        &self,
        predictions: &Array1<f64>,
        targets: &Array1<f64>,
    ) -> Result<(Array1<f64>, Array1<f64>)> {
        if predictions.len() != targets.len() {
            return Err(Error::ShapeMismatch {
                expected: (targets.len(), 1),
                actual: (predictions.len(), 1),
            });
        }
        Ok((
            self.params.inverse_array(predictions),
            self.params.inverse_array(targets),
        ))
    }

    /// Denormalize and attach the target timestamps
    pub fn align(
        &self,
        timestamps: &[DateTime<Utc>],
        predictions: &Array1<f64>,
        targets: &Array1<f64>,
    ) -> Result<Vec<ForecastPoint>> {
        let (predicted, actual) = self.rescale(predictions, targets)?;

        if timestamps.len() != actual.len() {
            return Err(Error::ShapeMismatch {
                expected: (actual.len(), 1),
                actual: (timestamps.len(), 1),
            });
        }

        Ok(timestamps
            .iter()
            .zip(actual.iter().zip(predicted.iter()))
            .map(|(&timestamp, (&actual, &predicted))| ForecastPoint {
                timestamp,
                actual,
                predicted,
            })
            .collect())
    }
}
