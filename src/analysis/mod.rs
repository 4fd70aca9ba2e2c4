//! # Analysis
//!
//! Presentation-side views of a raw price series: summary statistics and
//! trailing moving averages. Nothing here feeds the forecast.

mod moving_average;
mod summary;

pub use moving_average::simple_moving_average;
pub use summary::SeriesSummary;
