//! Error types for the forecasting pipeline

use crate::pipeline::Stage;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Source series is empty, too short, unordered or could not be fetched
    #[error("Input data error: {0}")]
    InputData(String),

    /// The fit segment has no price range, so it cannot be normalized
    #[error("Degenerate range: fit segment min ({min}) and max ({max}) do not span an interval")]
    DegenerateRange { min: f64, max: f64 },

    /// Window batch does not match the shape the predictor was built for.
    /// Shapes are `(sequence_length, features)`.
    #[error("Shape mismatch: predictor expects {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Pretrained model could not be loaded
    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    /// A pipeline stage failed; wraps the underlying error
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary model encoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

impl Error {
    /// Attach the pipeline stage this error aborted.
    ///
    /// Errors that already carry a stage are returned unchanged.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            Error::Stage { .. } => self,
            other => Error::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage that failed, if the error came out of the pipeline
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The error with any stage wrapper removed
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this error is a configuration-level problem rather than bad data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root_cause(),
            Error::Config(_) | Error::ShapeMismatch { .. } | Error::ModelLoad { .. }
        )
    }
}
