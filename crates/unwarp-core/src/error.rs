//! Error types for core image and transform operations.

use thiserror::Error;

/// Error type for image containers, voxel grids and transforms.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Transform could not be built, inverted or applied.
    #[error("Transform error: {0}")]
    TransformError(String),

    /// Image geometry (origin, spacing, direction) is unusable.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Tensor data could not be moved between backend and host.
    #[error("Tensor data error: {0}")]
    TensorData(String),

    /// Buffer length or dimensions disagree.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::TransformError(msg.into())
    }

    /// Create an invalid geometry error.
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    /// Create a tensor data error.
    pub fn tensor_data(msg: impl Into<String>) -> Self {
        Self::TensorData(msg.into())
    }
}
