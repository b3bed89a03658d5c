//! Error types for concept-revision
//!
//! Every failure is a local input or invariant violation. Nothing is retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Concept-revision error types
#[derive(Error, Debug)]
pub enum Error {
    /// Feature name outside the closed feature table
    #[error("Unknown feature: {0}\nValid features: circle, square, red, blue, solid, striped, big, small")]
    UnknownFeature(String),

    /// Malformed input or configuration value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A trial was defined without any labeled examples
    #[error("Trial '{trial_id}' has no examples\nEvery trial needs at least one labeled example")]
    EmptyExamples {
        /// Offending trial ID
        trial_id: String,
    },

    /// Tried to normalize an empty response tally
    #[error("Empty distribution: {0}\nProportions are undefined without observations")]
    EmptyDistribution(String),

    /// Grid search was configured with no points
    #[error("Parameter grid is empty\nEach of p_add, steps and temperature needs at least one value")]
    EmptyGrid,

    /// Storage error (JSON/Parquet files)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
