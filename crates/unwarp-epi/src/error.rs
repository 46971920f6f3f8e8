//! Error types for unwarping operations.
//!
//! Configuration problems are detected before any voxel is resampled; transform
//! problems surface per slice and abort the run.

use thiserror::Error;
use unwarp_core::CoreError;

/// Main error type for unwarping operations.
#[derive(Error, Debug)]
pub enum UnwarpError {
    /// Invalid configuration (motion table, alignment index, PE table).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Dimension mismatch between inputs.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Shape mismatch.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Error in transform composition.
    #[error("Transform error: {0}")]
    TransformError(String),

    /// Error raised by image or transform primitives.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for unwarping operations.
pub type Result<T> = std::result::Result<T, UnwarpError>;

impl UnwarpError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::TransformError(msg.into())
    }

    /// Whether the error was raised while validating inputs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::DimensionMismatch(_) | Self::ShapeMismatch { .. }
        )
    }
}
