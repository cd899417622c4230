//! Error types for playback and the fallback voice.
//!
//! Synthesis never returns these; its failures are reported through
//! [`SynthesisOutcome`](crate::SynthesisOutcome). The queue logs every
//! [`AnnouncerError`] and keeps going.

/// Errors raised while producing sound.
#[derive(Debug, thiserror::Error)]
pub enum AnnouncerError {
    /// The external command could not be started.
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing audio to the player or waiting for it failed.
    #[error("I/O error talking to `{program}`: {source}")]
    Io {
        /// Program being driven.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external command exited unsuccessfully.
    #[error("`{program}` exited with {status}")]
    CommandFailed {
        /// Program that failed.
        program: String,
        /// Exit status, as reported by the OS.
        status: String,
    },

    /// No command is configured for this output.
    #[error("no command configured")]
    NotConfigured,
}
