//! Metrics for evaluating forecasts against ground truth
//!
//! All functions take the ground truth first and the forecast second, as
//! position-aligned slices of equal length. The free functions only read the
//! common prefix; [`ForecastMetrics::compute`] asserts equal lengths in debug
//! builds.

use serde::{Deserialize, Serialize};

/// Mean Squared Error
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean(y_true.iter().zip(y_pred).map(|(t, p)| (t - p).powi(2)))
}

/// Root Mean Squared Error
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mse(y_true, y_pred).sqrt()
}

/// Mean Absolute Error
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mean(y_true.iter().zip(y_pred).map(|(t, p)| (t - p).abs()))
}

/// Mean Absolute Percentage Error, in percent.
///
/// Zero targets are left out of both the sum and the count; returns 0 when
/// no target is non-zero.
pub fn mape(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let (sum, count) = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, _)| **t != 0.0)
        .fold((0.0, 0usize), |(s, c), (t, p)| (s + ((t - p) / t).abs(), c + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64 * 100.0
    }
}

/// R² score (coefficient of determination)
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    let mean_true = mean(y_true[..n].iter().copied());

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    let ss_tot: f64 = y_true[..n].iter().map(|t| (t - mean_true).powi(2)).sum();

    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - (ss_res / ss_tot)
    }
}

/// Share of steps where the forecast moves in the same direction as the truth
pub fn directional_accuracy(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n < 2 {
        return 0.0;
    }

    let correct = (1..n)
        .filter(|&i| (y_true[i] > y_true[i - 1]) == (y_pred[i] > y_pred[i - 1]))
        .count();

    correct as f64 / (n - 1) as f64
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Summary of forecast quality in original price units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub count: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
    pub r2: f64,
    pub directional_accuracy: f64,
}

impl ForecastMetrics {
    /// Compute every metric for an aligned pair of sequences
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        debug_assert_eq!(
            y_true.len(),
            y_pred.len(),
            "ground truth and forecast must be aligned"
        );
        Self {
            count: y_true.len().min(y_pred.len()),
            mse: mse(y_true, y_pred),
            rmse: rmse(y_true, y_pred),
            mae: mae(y_true, y_pred),
            mape: mape(y_true, y_pred),
            r2: r2_score(y_true, y_pred),
            directional_accuracy: directional_accuracy(y_true, y_pred),
        }
    }
}

impl std::fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast metrics ({} points):", self.count)?;
        writeln!(f, "  MSE:                  {:.6}", self.mse)?;
        writeln!(f, "  RMSE:                 {:.6}", self.rmse)?;
        writeln!(f, "  MAE:                  {:.6}", self.mae)?;
        writeln!(f, "  MAPE:                 {:.2}%", self.mape)?;
        writeln!(f, "  R²:                   {:.4}", self.r2)?;
        write!(
            f,
            "  Directional accuracy: {:.2}%",
            self.directional_accuracy * 100.0
        )
    }
}
