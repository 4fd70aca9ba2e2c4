//! Data sources that supply price series
//!
//! The pipeline only depends on the [`DataSource`] trait. A failed or empty
//! fetch is always reported as [`Error::InputData`].

use super::types::{Observation, Series};
use crate::error::{Error, Result};
use crate::utils::load_observations_csv;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Anything that can supply a price series for an instrument and date range
pub trait DataSource {
    /// Fetch observations with `start <= date < end`
    fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<Series>;
}

/// Keep observations whose calendar date lies in `[start, end)`
fn filter_range(
    observations: Vec<Observation>,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<Observation> {
    observations
        .into_iter()
        .filter(|o| {
            let day = o.timestamp.date_naive();
            day >= start && day < end
        })
        .collect()
}

fn check_range(instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start >= end {
        return Err(Error::InputData(format!(
            "{}: empty date range {} .. {}",
            instrument, start, end
        )));
    }
    Ok(())
}

/// Reads `<dir>/<INSTRUMENT>.csv` files with a date column and a close column
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    /// Create a source rooted at a data directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the CSV file for an instrument
    pub fn path_for(&self, instrument: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", instrument.to_uppercase()))
    }
}

impl DataSource for CsvSource {
    fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<Series> {
        check_range(instrument, start, end)?;

        let path = self.path_for(instrument);
        debug!("Reading {} from {}", instrument, path.display());

        let observations = load_observations_csv(&path).map_err(|e| match e {
            e @ Error::InputData(_) => e,
            other => Error::InputData(format!(
                "failed to fetch {} from {}: {}",
                instrument,
                path.display(),
                other
            )),
        })?;

        let filtered = filter_range(observations, start, end);
        info!(
            "Loaded {} observations for {} ({} .. {})",
            filtered.len(),
            instrument,
            start,
            end
        );

        Series::new(instrument, filtered)
    }
}

/// In-memory source, mostly for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    series: HashMap<String, Vec<Observation>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register observations for an instrument
    pub fn insert(&mut self, instrument: &str, observations: Vec<Observation>) {
        self.series
            .insert(instrument.to_uppercase(), observations);
    }

    /// Builder-style [`MemorySource::insert`]
    pub fn with_series(mut self, series: &Series) -> Self {
        self.insert(series.symbol(), series.observations().to_vec());
        self
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, instrument: &str, start: NaiveDate, end: NaiveDate) -> Result<Series> {
        check_range(instrument, start, end)?;

        let observations = self
            .series
            .get(&instrument.to_uppercase())
            .ok_or_else(|| Error::InputData(format!("unknown instrument {}", instrument)))?;

        Series::new(instrument, filter_range(observations.clone(), start, end))
    }
}
