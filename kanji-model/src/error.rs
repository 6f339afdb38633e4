//! Model loading error types.

use std::path::PathBuf;

use kanji_core::InkError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while loading model assets.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An asset file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Asset path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The model file is not valid JSON for the expected format.
    #[error("Malformed model: {0}")]
    Parse(#[from] serde_json::Error),

    /// Weight or bias dimensions do not agree with the declared input size.
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Neither the model nor a label resource supplied labels.
    #[error("Model has no labels")]
    MissingLabels,

    /// Label count differs from the number of output classes.
    #[error("Label mismatch: {labels} labels for {classes} classes")]
    LabelMismatch {
        /// Number of labels provided.
        labels: usize,
        /// Number of output classes.
        classes: usize,
    },
}

impl From<ModelError> for InkError {
    fn from(err: ModelError) -> Self {
        InkError::ModelLoad(err.to_string())
    }
}
