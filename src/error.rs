//! Error types for geodata-dl
//!
//! The taxonomy mirrors how failures are handled:
//! - Configuration problems are fatal and surface before any retrieval starts
//! - Retrieval failures are recovered per partition by the fetch stage
//! - Storage failures are never recovered locally and propagate to the caller

use thiserror::Error;

/// Result type alias for geodata-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for geodata-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "partition_keys")
        key: Option<String>,
    },

    /// A single retrieval from an archival service failed
    ///
    /// The fetch stage recovers this class of error per partition; it only
    /// escapes when a backend is invoked directly.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// HTTP transport error while talking to an archival service
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Durable store rejected a write
    #[error("store error: {0}")]
    Store(String),
}

impl Error {
    /// Build a configuration error tied to a specific config key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
