//! # Data Module
//!
//! Price series storage and the sources that supply it.
//!
//! - `types` - `Observation`, `Series` and `Segment`
//! - `source` - the `DataSource` trait with CSV and in-memory implementations

mod source;
mod types;

pub use source::{CsvSource, DataSource, MemorySource};
pub use types::{Observation, Segment, Series};
