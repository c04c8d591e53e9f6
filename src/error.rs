//! Error types for the Casdoor gateway

use std::io;

use thiserror::Error;

/// Result type alias for the Casdoor gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Startup and server errors.
///
/// Request-level failures never surface here; they are rendered by
/// [`ApiError`](crate::gateway::error::ApiError) inside the handler that
/// detects them.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested `host:port`
        addr: String,
        /// Underlying error
        source: io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Self::Config(e.to_string())
    }
}
