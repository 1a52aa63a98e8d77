//! Error types for the vinoml pipeline and serving stack

use thiserror::Error;

/// Result type alias for vinoml operations
pub type Result<T> = std::result::Result<T, VinoError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum VinoError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Schema mismatch: expected columns {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for VinoError {
    fn from(err: polars::error::PolarsError) -> Self {
        VinoError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for VinoError {
    fn from(err: serde_json::Error) -> Self {
        VinoError::SerializationError(err.to_string())
    }
}
