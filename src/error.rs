//! Error types for the browser shell

use thiserror::Error;

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the shell or an engine backend
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize an engine backend
    #[error("Engine initialization failed: {0}")]
    Initialization(String),

    /// Failed to load a URI
    #[error("Failed to load URI: {0}")]
    Load(String),

    /// Failed to render the live viewport
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failed to encode a snapshot image
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    /// Filesystem failure while writing a snapshot
    #[error("Snapshot write failed: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    Cdp(String),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Cdp(err.to_string())
    }
}
