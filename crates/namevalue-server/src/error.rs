//! Error types for the server binary.
//!
//! [`StartupError`] wraps every failure that stops the server from coming
//! up. Anything after startup degrades instead of failing.

/// Top-level startup error.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: namevalue_core::ConfigError,
    },

    /// The durable store could not be opened.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: namevalue_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("HTTP server error: {source}")]
    Http {
        /// The underlying server error.
        #[from]
        source: namevalue_observer::ServerError,
    },
}
