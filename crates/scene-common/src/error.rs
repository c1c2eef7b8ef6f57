//! Error types for the common value types.

use thiserror::Error;

/// Result type alias using SceneError.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised while interpreting values read from a sidecar document.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid spatial reference: {0}")]
    InvalidSpatialReference(String),

    #[error("Invalid acquisition time: {0}")]
    InvalidTime(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),

    #[error("Unknown pixel type: {0}")]
    UnknownPixelType(String),
}
