//! Price series types

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single dated price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Price (usually the daily close)
    pub value: f64,
}

impl Observation {
    /// Create a new observation
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Chronologically ordered price series of one instrument.
///
/// Timestamps are strictly increasing. The series cannot be modified after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    observations: Vec<Observation>,
}

impl Series {
    /// Create a series, checking that it is non-empty and strictly ordered
    pub fn new(symbol: &str, observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(Error::InputData(format!("no observations for {}", symbol)));
        }

        if let Some(i) = observations
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            let (prev, next) = (&observations[i], &observations[i + 1]);
            return Err(Error::InputData(format!(
                "{}: observation {} at {} does not follow {}",
                symbol,
                i + 1,
                next.timestamp,
                prev.timestamp
            )));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            observations,
        })
    }

    /// Build a daily series from plain values starting at `start`
    pub fn from_values(symbol: &str, start: DateTime<Utc>, values: &[f64]) -> Result<Self> {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation::new(start + Duration::days(i as i64), value))
            .collect();
        Self::new(symbol, observations)
    }

    /// Instrument identifier
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false for a constructed series
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in chronological order
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Price values in chronological order
    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    /// Timestamps in chronological order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).collect()
    }

    /// First observation
    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    /// Last observation
    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// View a contiguous index range of the series
    pub fn segment(&self, range: Range<usize>) -> Result<Segment<'_>> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::InputData(format!(
                "segment {:?} out of bounds for series of length {}",
                range,
                self.len()
            )));
        }
        Ok(Segment {
            series: self,
            start: range.start,
            end: range.end,
        })
    }

    /// The whole series as a segment
    pub fn full(&self) -> Segment<'_> {
        Segment {
            series: self,
            start: 0,
            end: self.len(),
        }
    }
}

/// Contiguous index range `[start, end)` of a [`Series`]
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    series: &'a Series,
    start: usize,
    end: usize,
}

impl<'a> Segment<'a> {
    /// First index (inclusive)
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last index (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of observations in the segment
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the segment is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Underlying series
    pub fn series(&self) -> &'a Series {
        self.series
    }

    /// Observations covered by the segment
    pub fn observations(&self) -> &'a [Observation] {
        &self.series.observations[self.start..self.end]
    }

    /// Price values covered by the segment
    pub fn values(&self) -> Vec<f64> {
        self.observations().iter().map(|o| o.value).collect()
    }

    /// Timestamps covered by the segment
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.observations().iter().map(|o| o.timestamp).collect()
    }

    /// The last `n` observations (or all of them if the segment is shorter)
    pub fn tail(&self, n: usize) -> Segment<'a> {
        Segment {
            series: self.series,
            start: self.end - n.min(self.len()),
            end: self.end,
        }
    }
}
