//! # Utilities
//!
//! Forecast evaluation metrics and file persistence.

mod io;
mod metrics;

pub use io::{
    load_json, load_observations_csv, parse_timestamp, save_forecasts_csv, save_json,
    save_series_csv,
};
pub use metrics::{directional_accuracy, mae, mape, mse, r2_score, rmse, ForecastMetrics};
