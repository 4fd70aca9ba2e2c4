//! # Stock Trend Forecast
//!
//! Daily closing-price forecasting with a pretrained sequence model.
//!
//! ## Overview
//!
//! A price series is split into a fit segment and a holdout segment. A min-max
//! scaler is fitted on the fit segment only, the last `lookback` fit
//! observations are prepended to the holdout to prime the first window, and
//! every sliding window is fed to an injected [`Predictor`]. Forecasts and
//! ground truth come back in price units, aligned by timestamp.
//!
//! ## Modules
//!
//! - `data` - Series types and data sources (CSV directory, in-memory)
//! - `preprocessing` - Splitter, min-max scaler, window builder, rescaler
//! - `model` - `Predictor` trait, stacked LSTM and naive baseline
//! - `pipeline` - Stage-by-stage orchestration and the forecast report
//! - `analysis` - Summary statistics and moving averages
//! - `utils` - Metrics and file persistence
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use stock_trend_forecast::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = CsvSource::new("data");
//!     let model = LstmPredictor::load("models/lstm_tsla.bin")?;
//!
//!     let pipeline = ForecastPipeline::new(PipelineConfig::default(), model)?;
//!     let report = pipeline.run_from_source(
//!         &source,
//!         "TSLA",
//!         NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     )?;
//!
//!     println!("{}", report.metrics());
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod preprocessing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::analysis::{simple_moving_average, SeriesSummary};
    pub use crate::config::PipelineConfig;
    pub use crate::data::{CsvSource, DataSource, MemorySource, Observation, Series};
    pub use crate::error::{Error, Result};
    pub use crate::model::{LSTMConfig, LstmPredictor, NaivePredictor, Predictor};
    pub use crate::pipeline::{ForecastPipeline, ForecastReport, PipelineWarning, Stage};
    pub use crate::preprocessing::{
        ForecastPoint, MinMaxScaler, Rescaler, ScalerParams, Splitter, WindowBuilder,
    };
    pub use crate::utils::ForecastMetrics;
}

// Re-export main types at crate root for convenience
pub use error::{Error, Result};
pub use model::Predictor;
pub use pipeline::{ForecastPipeline, ForecastReport};
