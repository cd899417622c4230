//! Error types for the storage layer.
//!
//! All errors are propagated via [`DbError`] which wraps the underlying
//! [`fred`], I/O, and JSON errors with context about which operation failed.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A file-backed read or write failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation touched.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
