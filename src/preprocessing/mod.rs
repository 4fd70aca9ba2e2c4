//! # Preprocessing
//!
//! Turns a price series into model inputs and model outputs back into prices:
//! - Fit / holdout split
//! - Min-max scaling fitted on the fit segment
//! - Sliding windows over the normalized priming tail + holdout
//! - Inverse rescaling of predictions and targets
//!
//! ## Example
//!
//! ```rust
//! use stock_trend_forecast::preprocessing::{MinMaxScaler, WindowBuilder};
//!
//! let params = MinMaxScaler::new().fit(&[10.0, 20.0]).unwrap();
//! let normalized = params.forward(&[10.0, 12.0, 14.0, 16.0]);
//!
//! let windows = WindowBuilder::new(2).unwrap().build(&normalized);
//! assert_eq!(windows.len(), 2);
//! ```

mod rescaler;
mod scaler;
mod splitter;
mod windows;

pub use rescaler::{ForecastPoint, Rescaler};
pub use scaler::{MinMaxScaler, ScalerParams};
pub use splitter::{Split, Splitter};
pub use windows::{Batches, Window, WindowBatch, WindowBuilder, WindowSet, Windows};
