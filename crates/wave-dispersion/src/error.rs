//! Error types for dispersion curve computation.

use thiserror::Error;

/// Errors raised while computing dispersion curves.
#[derive(Error, Debug)]
pub enum DispersionError {
    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Equivalent depth that is not positive.
    #[error("invalid equivalent depth: {0} m")]
    InvalidDepth(f64),

    /// Wave type name that does not parse.
    #[error("unknown wave type: {0}")]
    UnknownWaveType(String),

    /// Serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DispersionError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DispersionError>;
