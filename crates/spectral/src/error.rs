//! Error types for spectral analysis.

use thiserror::Error;

/// Errors that can occur while transforming arrays.
#[derive(Error, Debug)]
pub enum SpectralError {
    /// The input has the wrong number of dimensions.
    #[error("expected a {expected}-dimensional array, got {actual} dimensions")]
    Dimension { expected: usize, actual: usize },

    /// Two arrays (or an array and its coordinates) do not conform.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Not enough samples along an axis for the requested operation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A matrix that must be inverted is singular.
    #[error("singular matrix: {0}")]
    Singular(String),

    /// The input contains values the routine cannot handle.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpectralError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create an InsufficientData error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for spectral operations.
pub type Result<T> = std::result::Result<T, SpectralError>;
