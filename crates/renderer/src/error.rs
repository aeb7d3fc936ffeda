//! Error types for rendering and plot styles.

use thiserror::Error;

/// Errors raised while turning spectra into images.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("buffer holds {actual} values, expected {expected}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("image is empty ({width}x{height})")]
    EmptyImage { width: usize, height: usize },

    #[error("unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}

/// Errors raised while building or writing a plot style.
#[derive(Error, Debug)]
pub enum StyleError {
    #[error("invalid style: {0}")]
    Invalid(String),

    #[error("invalid color '{0}'")]
    Color(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;
pub type StyleResult<T> = std::result::Result<T, StyleError>;
