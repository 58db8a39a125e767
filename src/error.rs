//! Error types for the diabetes predictor

use thiserror::Error;

/// Result type alias for predictor operations
pub type Result<T> = std::result::Result<T, DiabetesError>;

/// Main error type for training, persistence and inference
#[derive(Error, Debug)]
pub enum DiabetesError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for DiabetesError {
    fn from(err: polars::error::PolarsError) -> Self {
        DiabetesError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for DiabetesError {
    fn from(err: serde_json::Error) -> Self {
        DiabetesError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for DiabetesError {
    fn from(err: bincode::Error) -> Self {
        DiabetesError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DiabetesError {
    fn from(err: ndarray::ShapeError) -> Self {
        DiabetesError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
