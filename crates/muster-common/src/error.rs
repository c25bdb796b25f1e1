//! Common error types for Muster components.

use thiserror::Error;

/// Common errors across Muster components
#[derive(Debug, Error)]
pub enum MusterError {
    /// Endpoint string is not of the form `address:port`
    #[error("Invalid endpoint '{0}': expected exactly one 'address:port' separator")]
    InvalidEndpoint(String),

    /// Handshake bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Handshake could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Socket I/O failure on an established connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl From<serde_json::Error> for MusterError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::Decode(err.to_string())
        }
    }
}
