//! Error types for the chatlist application.
//!
//! Errors are `thiserror` enums per concern that compose through `?` and `From`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - top-level error returned from startup and the main loop
//!   - [`crate::config::ConfigError`] - config file read/parse failures, invalid tuning
//!   - [`crate::logging::LoggingError`] - tracing subscriber setup failures
//!   - [`HistoryError`] - note file load/save failures
//!   - `std::io::Error` - terminal failures
//!
//! # Recovery Strategy
//!
//! The message list itself never fails. Send failures become `Role::Error`
//! messages in the conversation and history save failures are logged, so only
//! startup and terminal errors reach the top level.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Conversation history could not be read or written.
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// Terminal or TUI rendering error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors from loading or saving conversation history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading the history note failed.
    #[error("Failed to read history at {path:?}: {source}")]
    Read {
        /// History file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the history note failed.
    #[error("Failed to write history at {path:?}: {source}")]
    Write {
        /// History file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A message could not be encoded.
    #[error("Failed to encode message {id}: {source}")]
    Encode {
        /// Id of the message that failed.
        id: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
