//! Sliding-window construction
//!
//! For a normalized sequence `S` of length `M` and lookback `L` the window set
//! holds `M - L` pairs: window `S[i-L..i]` and target `S[i]` for `i` in `L..M`.
//! When `L >= M` the set is simply empty.
//!
//! Windows borrow the source sequence and are produced lazily; iterating a
//! [`WindowSet`] again starts over from the first window.

use crate::error::{Error, Result};
use ndarray::{Array1, Array3};
use std::iter::FusedIterator;

/// One model input and the value that follows it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    /// Position of the target in the source sequence
    pub index: usize,
    /// The `L` values preceding the target
    pub values: &'a [f64],
    /// The value immediately after the window
    pub target: f64,
}

/// Builds window sets for a fixed lookback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBuilder {
    lookback: usize,
}

impl WindowBuilder {
    /// Create a builder; the lookback must be at least 1
    pub fn new(lookback: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(Error::Config("lookback must be at least 1".to_string()));
        }
        Ok(Self { lookback })
    }

    /// Lookback length
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Window set over a normalized sequence
    pub fn build<'a>(&self, data: &'a [f64]) -> WindowSet<'a> {
        WindowSet {
            data,
            lookback: self.lookback,
        }
    }
}

/// Restartable, finite set of (window, target) pairs over a borrowed sequence
#[derive(Debug, Clone, Copy)]
pub struct WindowSet<'a> {
    data: &'a [f64],
    lookback: usize,
}

impl<'a> WindowSet<'a> {
    /// Number of pairs
    pub fn len(&self) -> usize {
        self.data.len().saturating_sub(self.lookback)
    }

    /// Whether there are no pairs
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookback length
    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Iterate from the first window
    pub fn iter(&self) -> Windows<'a> {
        Windows {
            data: self.data,
            lookback: self.lookback,
            next: self.lookback,
        }
    }

    /// Targets in window order
    pub fn targets(&self) -> Array1<f64> {
        self.iter().map(|w| w.target).collect()
    }

    /// Materialize every window as a `[n, L, 1]` tensor plus targets
    pub fn to_batch(&self) -> WindowBatch {
        WindowBatch::from_windows(0, self.lookback, self.iter())
    }

    /// Materialize windows in chunks of at most `batch_size`
    pub fn batches(&self, batch_size: usize) -> Batches<'a> {
        Batches {
            windows: self.iter(),
            batch_size: batch_size.max(1),
            offset: 0,
        }
    }
}

impl<'a> IntoIterator for &WindowSet<'a> {
    type Item = Window<'a>;
    type IntoIter = Windows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over the windows of a [`WindowSet`]
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    data: &'a [f64],
    lookback: usize,
    next: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = Window<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.data.len() {
            return None;
        }
        let i = self.next;
        self.next += 1;

        Some(Window {
            index: i,
            values: &self.data[i - self.lookback..i],
            target: self.data[i],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

impl FusedIterator for Windows<'_> {}

/// A materialized chunk of windows
#[derive(Debug, Clone)]
pub struct WindowBatch {
    /// Position of the first window within the window set
    pub offset: usize,
    /// Model input `[batch, lookback, 1]`
    pub inputs: Array3<f64>,
    /// Targets, one per window
    pub targets: Array1<f64>,
}

impl WindowBatch {
    fn from_windows<'a>(
        offset: usize,
        lookback: usize,
        windows: impl ExactSizeIterator<Item = Window<'a>>,
    ) -> Self {
        let n = windows.len();
        let mut flat = Vec::with_capacity(n * lookback);
        let mut targets = Vec::with_capacity(n);

        for window in windows {
            flat.extend_from_slice(window.values);
            targets.push(window.target);
        }

        let inputs = Array3::from_shape_vec((targets.len(), lookback, 1), flat)
            .unwrap_or_else(|_| Array3::zeros((0, lookback, 1)));

        Self {
            offset,
            inputs,
            targets: Array1::from(targets),
        }
    }

    /// Number of windows in the batch
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Iterator over materialized chunks of a [`WindowSet`]
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    windows: Windows<'a>,
    batch_size: usize,
    offset: usize,
}

impl Iterator for Batches<'_> {
    type Item = WindowBatch;

    fn next(&mut self) -> Option<Self::Item> {
        let remaining = self.windows.len();
        if remaining == 0 {
            return None;
        }
        let take = remaining.min(self.batch_size);
        let lookback = self.windows.lookback;
        let batch = WindowBatch::from_windows(self.offset, lookback, self.windows.by_ref().take(take));
        self.offset += take;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.windows.len() + self.batch_size - 1) / self.batch_size;
        (n, Some(n))
    }
}
