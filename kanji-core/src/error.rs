//! Error types for the handwriting pipeline.

use thiserror::Error;

/// Result type for pipeline operations.
pub type InkResult<T> = Result<T, InkError>;

/// Errors that can occur in the handwriting pipeline.
#[derive(Debug, Error)]
pub enum InkError {
    /// Stroke lifecycle or interaction state violated (e.g. extend without begin).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Classifier assets could not be initialized.
    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    /// Candidate belongs to a result set that has since been replaced.
    #[error("Stale candidate: {0}")]
    StaleCandidate(String),

    /// Rasterization error.
    #[error("Rasterization error: {0}")]
    Raster(String),

    /// Clipboard sink rejected the text.
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl InkError {
    /// Whether this error is a local precondition violation that callers
    /// should guard and log rather than surface to the user.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::InvalidState(_) | Self::StaleCandidate(_))
    }
}
