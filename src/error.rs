//! Error types for slide conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while detecting, rendering or normalizing slides
#[derive(Error, Debug)]
pub enum Error {
    /// The input document does not exist
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Filesystem error while reading input or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode, process or encode an image
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A CSS selector could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    /// Failed to start the rendering backend
    #[error("Renderer initialization failed: {0}")]
    InitializationError(String),

    /// Failed to render content
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

// Browser-side failures arrive as `anyhow` chains; keep every layer.
#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::RenderError(format!("{:#}", err))
    }
}
