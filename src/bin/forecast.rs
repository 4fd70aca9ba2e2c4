//! Forecast daily closes of an instrument over its holdout period
//!
//! Usage:
//!     cargo run --release --bin forecast -- --ticker TSLA --model models/lstm_tsla.bin
//!     cargo run --bin forecast -- --ticker TSLA --naive --lookback 100

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use stock_trend_forecast::analysis::{simple_moving_average, SeriesSummary};
use stock_trend_forecast::config::PipelineConfig;
use stock_trend_forecast::data::{CsvSource, DataSource};
use stock_trend_forecast::model::{LstmPredictor, NaivePredictor, Predictor};
use stock_trend_forecast::pipeline::{ForecastPipeline, Stage};
use stock_trend_forecast::utils::save_forecasts_csv;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Forecast daily closing prices with a pretrained LSTM
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one `<TICKER>.csv` per instrument
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Instrument identifier
    #[arg(short, long, default_value = "TSLA")]
    ticker: String,

    /// First date to include (YYYY-MM-DD)
    #[arg(long, default_value = "2014-01-01")]
    start: String,

    /// First date to exclude (YYYY-MM-DD)
    #[arg(long, default_value = "2024-01-01")]
    end: String,

    /// Pretrained model file (.bin or .json)
    #[arg(short, long, default_value = "models/lstm_tsla.bin")]
    model: PathBuf,

    /// Pipeline configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the lookback length
    #[arg(long)]
    lookback: Option<usize>,

    /// Override the split fraction
    #[arg(long)]
    split: Option<f64>,

    /// Use the persistence baseline instead of a model file
    #[arg(long, default_value_t = false)]
    naive: bool,

    /// Where to write the aligned forecasts
    #[arg(short, long, default_value = "forecast.csv")]
    output: PathBuf,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", raw))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("=== Stock Trend Forecast: {} ===\n", args.ticker);

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(lookback) = args.lookback {
        config = config.with_lookback(lookback);
    }
    if let Some(split) = args.split {
        config = config.with_split_fraction(split);
    }
    config.validate()?;

    let start = parse_date(&args.start)?;
    let end = parse_date(&args.end)?;

    // Load
    let source = CsvSource::new(&args.data_dir);
    let series = source
        .fetch(&args.ticker, start, end)
        .map_err(|e| e.at_stage(Stage::Load))?;

    let closes = series.values();
    println!("Data from {} to {}\n", start, end);
    if let Some(summary) = SeriesSummary::describe(&closes) {
        println!("{}\n", summary);
    }

    for window in [100, 200] {
        match simple_moving_average(&closes, window).last().copied().flatten() {
            Some(ma) => println!("MA{:<4} {:>14.4}", window, ma),
            None => println!("MA{:<4} {:>14}", window, "n/a"),
        }
    }
    println!();

    let predictor: Box<dyn Predictor> = if args.naive {
        Box::new(NaivePredictor::new(config.lookback))
    } else {
        Box::new(LstmPredictor::load(&args.model)?)
    };
    info!("Using {} predictor", predictor.name());

    let pipeline = ForecastPipeline::new(config, predictor)?;
    let report = pipeline.run(&series)?;

    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    println!(
        "Fit segment: {} points, holdout: {} points",
        report.fit_len, report.holdout_len
    );
    println!(
        "Scaler range: [{:.4}, {:.4}]\n",
        report.params.min(),
        report.params.max()
    );

    if report.is_empty() {
        println!("No forecasts produced.");
        return Ok(());
    }

    println!("{}\n", report.metrics());

    save_forecasts_csv(&report.points, &args.output)?;
    println!("Saved {} forecasts to {}", report.len(), args.output.display());

    Ok(())
}
