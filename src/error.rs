//! Error types for extraction, rendering and export

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or exporting a preview
#[derive(Error, Debug)]
pub enum Error {
    /// The rasterization backend could not be started
    #[error("Rasterization backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Failed to rasterize the render target
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Failed to encode a bitmap as PNG or PDF
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Invalid or unusable CORS relay endpoint
    #[error("Relay error: {0}")]
    RelayError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The raster worker thread went away
    #[error("Raster worker error: {0}")]
    WorkerError(String),

    /// Writing an artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::CdpError(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::EncodeError(err.to_string())
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::EncodeError(format!("pdf: {}", err))
    }
}
