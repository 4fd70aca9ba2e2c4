//! # Forecast pipeline
//!
//! Runs a series through a strictly linear sequence of stages:
//!
//! ```text
//! Load -> Split -> FitScale -> BuildWindows -> Predict -> Rescale -> Done
//! ```
//!
//! A failing stage aborts the run; the returned error names the stage (see
//! [`Error::stage`]). No partial result is produced.

use crate::config::PipelineConfig;
use crate::data::{DataSource, Series};
use crate::error::{Error, Result};
use crate::model::Predictor;
use crate::preprocessing::{
    ForecastPoint, MinMaxScaler, Rescaler, ScalerParams, Splitter, WindowBuilder,
};
use crate::utils::ForecastMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Load,
    Split,
    FitScale,
    BuildWindows,
    Predict,
    Rescale,
    Done,
}

impl Stage {
    /// Stage that follows this one; `Done` is terminal
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Load => Some(Stage::Split),
            Stage::Split => Some(Stage::FitScale),
            Stage::FitScale => Some(Stage::BuildWindows),
            Stage::BuildWindows => Some(Stage::Predict),
            Stage::Predict => Some(Stage::Rescale),
            Stage::Rescale => Some(Stage::Done),
            Stage::Done => None,
        }
    }

    /// Short kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Split => "split",
            Stage::FitScale => "fit-scale",
            Stage::BuildWindows => "build-windows",
            Stage::Predict => "predict",
            Stage::Rescale => "rescale",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal condition reported alongside a completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineWarning {
    /// The inference input was not longer than the lookback, so no window
    /// could be formed and no forecast was made
    EmptyWindowSet { input_len: usize, lookback: usize },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::EmptyWindowSet {
                input_len,
                lookback,
            } => write!(
                f,
                "empty window set: {} input points with lookback {} yield no forecasts",
                input_len, lookback
            ),
        }
    }
}

/// Forecasts produced from an already normalized input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Aligned (actual, predicted) pairs in original units
    pub points: Vec<ForecastPoint>,
    /// Warnings raised along the way
    pub warnings: Vec<PipelineWarning>,
}

/// Outcome of a complete pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Instrument the series belongs to
    pub symbol: String,
    /// Parameters fitted on the fit segment
    pub params: ScalerParams,
    /// Length of the fit segment
    pub fit_len: usize,
    /// Length of the holdout segment
    pub holdout_len: usize,
    /// Aligned forecasts, one per holdout observation
    pub points: Vec<ForecastPoint>,
    /// Warnings raised during the run
    pub warnings: Vec<PipelineWarning>,
}

impl ForecastReport {
    /// Forecast prices in order
    pub fn predicted(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    /// Ground-truth prices in order
    pub fn actual(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.actual).collect()
    }

    /// Number of forecasts
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no forecast was made
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Error metrics of the forecasts against the ground truth
    pub fn metrics(&self) -> ForecastMetrics {
        ForecastMetrics::compute(&self.actual(), &self.predicted())
    }
}

/// Split, scale, window, predict and rescale a price series
#[derive(Debug)]
pub struct ForecastPipeline<P: Predictor> {
    config: PipelineConfig,
    splitter: Splitter,
    scaler: MinMaxScaler,
    windows: WindowBuilder,
    predictor: P,
}

impl<P: Predictor> ForecastPipeline<P> {
    /// Build a pipeline around a pretrained predictor.
    ///
    /// Fails with [`Error::Config`] if the configuration is invalid.
    pub fn new(config: PipelineConfig, predictor: P) -> Result<Self> {
        config.validate()?;
        let (low, high) = config.feature_range;

        Ok(Self {
            splitter: Splitter::from_config(&config)?,
            scaler: MinMaxScaler::with_range(low, high)?,
            windows: WindowBuilder::new(config.lookback)?,
            config,
            predictor,
        })
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The injected predictor
    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Fetch a series from `source` and run it
    pub fn run_from_source(
        &self,
        source: &dyn DataSource,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ForecastReport> {
        enter(Stage::Load);
        let series = source
            .fetch(instrument, start, end)
            .map_err(|e| e.at_stage(Stage::Load))?;
        debug!("Load stage returned {} observations", series.len());

        self.run(&series)
    }

    /// Run every stage on an already loaded series
    pub fn run(&self, series: &Series) -> Result<ForecastReport> {
        if series.is_empty() {
            return Err(Error::InputData("series is empty".to_string()).at_stage(Stage::Load));
        }

        enter(Stage::Split);
        let split = self
            .splitter
            .split(series)
            .map_err(|e| e.at_stage(Stage::Split))?;
        info!(
            "Split {} observations into fit {} / holdout {}",
            series.len(),
            split.fit.len(),
            split.holdout.len()
        );

        enter(Stage::FitScale);
        let params = self
            .scaler
            .fit(&split.fit.values())
            .map_err(|e| e.at_stage(Stage::FitScale))?;
        info!(
            "Fitted scaler on [{:.4}, {:.4}] (scale {:.6})",
            params.min(),
            params.max(),
            params.scale()
        );

        let input = split.inference_input();
        let normalized = params.forward(&input.values());
        let forecast = self.forecast_prepared(params, &normalized, &input.timestamps())?;

        Ok(ForecastReport {
            symbol: series.symbol().to_string(),
            params,
            fit_len: split.fit.len(),
            holdout_len: split.holdout.len(),
            points: forecast.points,
            warnings: forecast.warnings,
        })
    }

    /// Window, predict and rescale a normalized input.
    ///
    /// `normalized` is the priming tail followed by the holdout, already passed
    /// through `params`; `timestamps` gives the time of each of its points.
    /// An input no longer than the lookback completes with no forecasts and an
    /// [`PipelineWarning::EmptyWindowSet`].
    pub fn forecast_prepared(
        &self,
        params: ScalerParams,
        normalized: &[f64],
        timestamps: &[DateTime<Utc>],
    ) -> Result<Forecast> {
        enter(Stage::BuildWindows);
        if timestamps.len() != normalized.len() {
            return Err(Error::InputData(format!(
                "{} timestamps for {} input points",
                timestamps.len(),
                normalized.len()
            ))
            .at_stage(Stage::BuildWindows));
        }

        let lookback = self.windows.lookback();
        let windows = self.windows.build(normalized);
        let mut warnings = Vec::new();

        if windows.is_empty() {
            let warning = PipelineWarning::EmptyWindowSet {
                input_len: normalized.len(),
                lookback,
            };
            warn!("{}", warning);
            warnings.push(warning);
            enter(Stage::Done);
            return Ok(Forecast {
                points: Vec::new(),
                warnings,
            });
        }
        info!("Built {} windows of length {}", windows.len(), lookback);

        enter(Stage::Predict);
        let mut predictions = Vec::with_capacity(windows.len());
        let mut targets = Vec::with_capacity(windows.len());

        for batch in windows.batches(self.config.batch_size) {
            debug!(
                "Predicting windows {}..{} with {}",
                batch.offset,
                batch.offset + batch.len(),
                self.predictor.name()
            );
            self.predictor
                .check_shape(&batch.inputs)
                .map_err(|e| e.at_stage(Stage::Predict))?;
            let output = self
                .predictor
                .predict(&batch.inputs)
                .map_err(|e| e.at_stage(Stage::Predict))?;

            if output.len() != batch.len() {
                return Err(Error::ShapeMismatch {
                    expected: (batch.len(), 1),
                    actual: (output.len(), 1),
                }
                .at_stage(Stage::Predict));
            }

            predictions.extend(output.iter().copied());
            targets.extend(batch.targets.iter().copied());
        }
        info!("{} produced {} forecasts", self.predictor.name(), predictions.len());

        enter(Stage::Rescale);
        let points = Rescaler::new(params)
            .align(
                &timestamps[lookback..],
                &Array1::from(predictions),
                &Array1::from(targets),
            )
            .map_err(|e| e.at_stage(Stage::Rescale))?;

        enter(Stage::Done);
        Ok(Forecast { points, warnings })
    }
}

fn enter(stage: Stage) {
    debug!("Entering stage {}", stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NaivePredictor;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use ndarray::Array3;

    fn series(values: &[f64]) -> Series {
        let start = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
        Series::from_values("TSLA", start, values).unwrap()
    }

    fn config(lookback: usize, split: f64) -> PipelineConfig {
        PipelineConfig::new()
            .with_lookback(lookback)
            .with_split_fraction(split)
    }

    /// Always returns the same number of outputs, whatever the batch
    struct FixedLength(usize);

    impl Predictor for FixedLength {
        fn input_shape(&self) -> (usize, usize) {
            (3, 1)
        }

        fn predict(&self, _batch: &Array3<f64>) -> Result<Array1<f64>> {
            Ok(Array1::zeros(self.0))
        }
    }

    #[test]
    fn test_ten_values() {
        let s = series(&(10..20).map(f64::from).collect::<Vec<_>>());
        let pipeline = ForecastPipeline::new(config(3, 0.7), NaivePredictor::new(3)).unwrap();

        let report = pipeline.run(&s).unwrap();

        assert_eq!(report.fit_len, 7);
        assert_eq!(report.holdout_len, 3);
        assert_eq!(report.len(), 3);
        assert!(report.warnings.is_empty());
        assert_eq!(report.params.min(), 10.0);
        assert_eq!(report.params.max(), 16.0);

        let expected_actual = [17.0, 18.0, 19.0];
        let expected_pred = [16.0, 17.0, 18.0];
        for (i, point) in report.points.iter().enumerate() {
            assert_relative_eq!(point.actual, expected_actual[i], epsilon = 1e-9);
            assert_relative_eq!(point.predicted, expected_pred[i], epsilon = 1e-9);
            assert_eq!(point.timestamp, s.observations()[7 + i].timestamp);
        }
    }

    #[test]
    fn test_degenerate_fit_segment() {
        let mut values = vec![5.0; 8];
        values.extend([6.0, 7.0]);
        let pipeline = ForecastPipeline::new(config(3, 0.7), NaivePredictor::new(3)).unwrap();

        let err = pipeline.run(&series(&values)).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::FitScale));
        assert!(matches!(err.root_cause(), Error::DegenerateRange { .. }));
    }

    #[test]
    fn test_too_short_series_fails_at_split() {
        let pipeline = ForecastPipeline::new(config(3, 0.7), NaivePredictor::new(3)).unwrap();
        let err = pipeline.run(&series(&[1.0, 2.0, 3.0, 4.0])).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Split));
        assert!(matches!(err.root_cause(), Error::InputData(_)));
    }

    #[test]
    fn test_window_length_mismatch_fails_at_predict() {
        let s = series(&(0..20).map(f64::from).collect::<Vec<_>>());
        let pipeline = ForecastPipeline::new(config(3, 0.7), NaivePredictor::new(4)).unwrap();

        let err = pipeline.run(&s).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Predict));
        assert!(matches!(
            err.root_cause(),
            Error::ShapeMismatch {
                expected: (4, 1),
                actual: (3, 1)
            }
        ));
        assert!(err.is_configuration());
    }

    /// Reports a fixed window length and never inspects its input
    struct Unchecked {
        sequence_length: usize,
    }

    impl Predictor for Unchecked {
        fn input_shape(&self) -> (usize, usize) {
            (self.sequence_length, 1)
        }

        fn predict(&self, batch: &Array3<f64>) -> Result<Array1<f64>> {
            Ok(Array1::zeros(batch.shape()[0]))
        }
    }

    #[test]
    fn test_pipeline_enforces_window_shape() {
        let s = series(&(0..20).map(f64::from).collect::<Vec<_>>());
        let pipeline =
            ForecastPipeline::new(config(3, 0.7), Unchecked { sequence_length: 100 }).unwrap();

        let err = pipeline.run(&s).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Predict));
        assert!(matches!(
            err.root_cause(),
            Error::ShapeMismatch {
                expected: (100, 1),
                actual: (3, 1)
            }
        ));

        let matching = ForecastPipeline::new(config(3, 0.7), Unchecked { sequence_length: 3 }).unwrap();
        assert_eq!(matching.run(&s).unwrap().len(), 6);
    }

    #[test]
    fn test_wrong_output_count_fails_at_predict() {
        let s = series(&(0..20).map(f64::from).collect::<Vec<_>>());
        let pipeline = ForecastPipeline::new(config(3, 0.7), FixedLength(1)).unwrap();

        let err = pipeline.run(&s).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Predict));
    }

    #[test]
    fn test_empty_window_set_warning() {
        let pipeline = ForecastPipeline::new(config(3, 0.7), NaivePredictor::new(3)).unwrap();
        let params = MinMaxScaler::new().fit(&[0.0, 1.0]).unwrap();
        let s = series(&[0.2, 0.4, 0.6]);

        let forecast = pipeline
            .forecast_prepared(params, &s.values(), &s.timestamps())
            .unwrap();

        assert!(forecast.points.is_empty());
        assert_eq!(
            forecast.warnings,
            vec![PipelineWarning::EmptyWindowSet {
                input_len: 3,
                lookback: 3
            }]
        );
    }

    #[test]
    fn test_batching_does_not_change_results() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0).collect();
        let s = series(&values);

        let whole = ForecastPipeline::new(config(5, 0.75), NaivePredictor::new(5))
            .unwrap()
            .run(&s)
            .unwrap();
        let chunked = ForecastPipeline::new(config(5, 0.75).with_batch_size(2), NaivePredictor::new(5))
            .unwrap()
            .run(&s)
            .unwrap();

        assert_eq!(whole, chunked);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let s = series(&(0..30).map(|i| (i * i % 17) as f64).collect::<Vec<_>>());
        let pipeline = ForecastPipeline::new(config(4, 0.75), NaivePredictor::new(4)).unwrap();

        assert_eq!(pipeline.run(&s).unwrap(), pipeline.run(&s).unwrap());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ForecastPipeline::new(config(0, 0.75), NaivePredictor::new(1));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Load;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited.len(), 7);
        assert_eq!(visited.last(), Some(&Stage::Done));
        assert_eq!(Stage::BuildWindows.to_string(), "build-windows");
    }
}
