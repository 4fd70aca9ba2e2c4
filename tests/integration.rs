//! End-to-end tests of the forecast pipeline

use approx::assert_relative_eq;
use chrono::{NaiveDate, TimeZone, Utc};
use stock_trend_forecast::prelude::*;
use stock_trend_forecast::utils::{save_forecasts_csv, save_series_csv};

fn synthetic_series(symbol: &str, n: usize) -> Series {
    let start = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    let values: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            150.0 + 0.2 * t + 12.0 * (t / 9.0).sin()
        })
        .collect();
    Series::from_values(symbol, start, &values).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_naive_forecast_from_memory_source() {
    let series = synthetic_series("TSLA", 400);
    let source = MemorySource::new().with_series(&series);

    let config = PipelineConfig::default();
    let pipeline = ForecastPipeline::new(config, NaivePredictor::new(100)).unwrap();
    let report = pipeline
        .run_from_source(&source, "TSLA", date(2014, 1, 1), date(2024, 1, 1))
        .unwrap();

    assert_eq!(report.fit_len, 300);
    assert_eq!(report.holdout_len, 100);
    assert_eq!(report.len(), report.holdout_len);
    assert!(report.warnings.is_empty());

    // Persistence forecasts the previous close
    let closes = series.values();
    for (i, point) in report.points.iter().enumerate() {
        assert_relative_eq!(point.actual, closes[300 + i], epsilon = 1e-9);
        assert_relative_eq!(point.predicted, closes[299 + i], epsilon = 1e-9);
    }

    let metrics = report.metrics();
    assert_eq!(metrics.count, 100);
    assert!(metrics.rmse > 0.0);
}

#[test]
fn test_lstm_forecast_shapes() {
    let series = synthetic_series("AAPL", 120);
    let config = PipelineConfig::new().with_lookback(10).with_batch_size(16);
    let model = LstmPredictor::random(LSTMConfig::new(1, 10, 8).with_layers(2), 42);

    let report = ForecastPipeline::new(config, model).unwrap().run(&series).unwrap();

    assert_eq!(report.len(), 30);
    assert!(report.predicted().iter().all(|v| v.is_finite()));
    assert_eq!(report.points[0].timestamp, series.observations()[90].timestamp);
}

#[test]
fn test_model_window_must_match_lookback() {
    let series = synthetic_series("AAPL", 120);
    let config = PipelineConfig::new().with_lookback(20);
    let model = LstmPredictor::random(LSTMConfig::new(1, 10, 4), 1);

    let err = ForecastPipeline::new(config, model).unwrap().run(&series).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Predict));
    assert!(matches!(err.root_cause(), Error::ShapeMismatch { .. }));
}

#[test]
fn test_csv_source_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let series = synthetic_series("TSLA", 60);
    save_series_csv(&series, dir.path().join("TSLA.csv")).unwrap();

    let source = CsvSource::new(dir.path());
    let loaded = source.fetch("tsla", date(2014, 1, 1), date(2015, 1, 1)).unwrap();

    assert_eq!(loaded.len(), series.len());
    assert_eq!(loaded.timestamps(), series.timestamps());
    for (a, b) in loaded.values().iter().zip(series.values()) {
        assert_relative_eq!(*a, b, epsilon = 1e-9);
    }

    let pipeline =
        ForecastPipeline::new(PipelineConfig::new().with_lookback(5), NaivePredictor::new(5))
            .unwrap();
    let report = pipeline.run(&loaded).unwrap();

    let out = dir.path().join("forecast.csv");
    save_forecasts_csv(&report.points, &out).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), report.len() + 1);
}

#[test]
fn test_unknown_instrument_fails_at_load() {
    let source = MemorySource::new();
    let pipeline = ForecastPipeline::new(PipelineConfig::default(), NaivePredictor::new(100)).unwrap();

    let err = pipeline
        .run_from_source(&source, "NOPE", date(2014, 1, 1), date(2024, 1, 1))
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Load));
    assert!(matches!(err.root_cause(), Error::InputData(_)));
}

#[test]
fn test_flat_history_is_degenerate() {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut values = vec![42.0; 30];
    values.extend((0..10).map(f64::from));
    let series = Series::from_values("FLAT", start, &values).unwrap();

    let pipeline =
        ForecastPipeline::new(PipelineConfig::new().with_lookback(5), NaivePredictor::new(5))
            .unwrap();
    let err = pipeline.run(&series).unwrap_err();

    assert_eq!(err.stage(), Some(Stage::FitScale));
    assert!(matches!(err.root_cause(), Error::DegenerateRange { .. }));
}

#[test]
fn test_stage_by_stage_with_short_input() {
    let series = synthetic_series("TSLA", 40);
    let splitter = Splitter::new(0.75, 10).unwrap();
    let split = splitter.split(&series).unwrap();
    let params = MinMaxScaler::new().fit(&split.fit.values()).unwrap();

    // Holdout alone is shorter than the lookback
    let holdout = params.forward(&split.holdout.values());
    let pipeline =
        ForecastPipeline::new(PipelineConfig::new().with_lookback(10), NaivePredictor::new(10))
            .unwrap();
    let forecast = pipeline
        .forecast_prepared(params, &holdout, &split.holdout.timestamps())
        .unwrap();

    assert!(forecast.points.is_empty());
    assert!(matches!(
        forecast.warnings.as_slice(),
        [PipelineWarning::EmptyWindowSet { input_len: 10, lookback: 10 }]
    ));
}

#[test]
fn test_inverse_uses_fit_range_only() {
    // Holdout breaks above the fit range; forecasts must still come back in price units
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let mut values: Vec<f64> = (0..30).map(|i| 10.0 + (i % 5) as f64).collect();
    values.extend((0..10).map(|i| 50.0 + i as f64));
    let series = Series::from_values("JUMP", start, &values).unwrap();

    let pipeline =
        ForecastPipeline::new(PipelineConfig::new().with_lookback(3), NaivePredictor::new(3))
            .unwrap();
    let report = pipeline.run(&series).unwrap();

    assert_eq!(report.params.min(), 10.0);
    assert_eq!(report.params.max(), 14.0);
    assert_relative_eq!(report.points[0].actual, 50.0, epsilon = 1e-9);
    assert_relative_eq!(report.points[9].actual, 59.0, epsilon = 1e-9);
    assert_relative_eq!(report.points[9].predicted, 58.0, epsilon = 1e-9);
}

#[test]
fn test_repeated_runs_match() {
    let series = synthetic_series("TSLA", 200);
    let model = LstmPredictor::random(LSTMConfig::new(1, 20, 6), 3);
    let pipeline =
        ForecastPipeline::new(PipelineConfig::new().with_lookback(20), model).unwrap();

    let first = pipeline.run(&series).unwrap();
    let second = pipeline.run(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_describe_and_moving_averages() {
    let series = synthetic_series("TSLA", 250);
    let closes = series.values();

    let summary = SeriesSummary::describe(&closes).unwrap();
    assert_eq!(summary.count, 250);
    assert!(summary.min <= summary.q25 && summary.q75 <= summary.max);

    let ma100 = simple_moving_average(&closes, 100);
    let ma200 = simple_moving_average(&closes, 200);
    assert_eq!(ma100.iter().filter(|v| v.is_none()).count(), 99);
    assert_eq!(ma200.iter().filter(|v| v.is_none()).count(), 199);
}
