//! Fit / holdout partitioning

use crate::config::PipelineConfig;
use crate::data::{Segment, Series};
use crate::error::{Error, Result};

/// Splits a series at `floor(N * split_fraction)` into a fit and a holdout segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splitter {
    split_fraction: f64,
    lookback: usize,
}

/// Result of splitting a series
#[derive(Debug, Clone, Copy)]
pub struct Split<'a> {
    /// Earlier part, used to fit the scaler
    pub fit: Segment<'a>,
    /// Later part, reserved for forecast evaluation
    pub holdout: Segment<'a>,
    lookback: usize,
}

impl Splitter {
    /// Create a splitter
    pub fn new(split_fraction: f64, lookback: usize) -> Result<Self> {
        if !(split_fraction > 0.0 && split_fraction < 1.0) {
            return Err(Error::Config(format!(
                "split fraction must lie in (0, 1), got {}",
                split_fraction
            )));
        }
        if lookback == 0 {
            return Err(Error::Config("lookback must be at least 1".to_string()));
        }
        Ok(Self {
            split_fraction,
            lookback,
        })
    }

    /// Create a splitter from the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.split_fraction, config.lookback)
    }

    /// Index of the first holdout observation for a series of length `n`
    pub fn split_index(&self, n: usize) -> usize {
        (n as f64 * self.split_fraction).floor() as usize
    }

    /// Partition the series.
    ///
    /// Fails when the holdout would be empty or the fit segment holds fewer
    /// than `lookback + 1` observations.
    pub fn split<'a>(&self, series: &'a Series) -> Result<Split<'a>> {
        let n = series.len();
        let index = self.split_index(n).min(n);

        if index < self.lookback + 1 {
            return Err(Error::InputData(format!(
                "series of {} observations gives a fit segment of {}, need at least {}",
                n,
                index,
                self.lookback + 1
            )));
        }
        if index == n {
            return Err(Error::InputData(format!(
                "series of {} observations leaves an empty holdout segment",
                n
            )));
        }

        Ok(Split {
            fit: series.segment(0..index)?,
            holdout: series.segment(index..n)?,
            lookback: self.lookback,
        })
    }
}

impl<'a> Split<'a> {
    /// The last `lookback` observations of the fit segment
    pub fn priming_tail(&self) -> Segment<'a> {
        self.fit.tail(self.lookback)
    }

    /// Priming tail followed by the holdout segment.
    ///
    /// Both parts are adjacent in the series, so this is a single segment.
    pub fn inference_input(&self) -> Segment<'a> {
        let start = self.priming_tail().start();
        self.fit
            .series()
            .full()
            .tail(self.holdout.end() - start)
    }

    /// Lookback length the split was made for
    pub fn lookback(&self) -> usize {
        self.lookback
    }
}
