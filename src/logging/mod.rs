//! Tracing subscriber initialization.
//!
//! The terminal belongs to the TUI, so logs go to a file.
//! Follow them with `tail -f ~/.local/state/chatlist/chatlist.log`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log path into the appender's directory and file name.
///
/// A bare file name logs into the current directory.
pub fn log_target(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, file_name.to_string()))
}

/// `RUST_LOG` if it parses, otherwise [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Creates the log directory if it doesn't exist.
///
/// # Errors
/// Fails if the path has no file name, the directory cannot be created, or a
/// subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let (directory, file_name) = log_target(log_path)?;

    std::fs::create_dir_all(&directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(&directory, file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn log_target_splits_directory_and_file() {
        let (directory, file) =
            log_target(Path::new("/var/log/chatlist/chatlist.log")).expect("valid path");
        assert_eq!(directory, PathBuf::from("/var/log/chatlist"));
        assert_eq!(file, "chatlist.log");
    }

    #[test]
    fn log_target_defaults_bare_file_to_current_directory() {
        let (directory, file) = log_target(Path::new("chat.log")).expect("valid path");
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file, "chat.log");
    }

    #[test]
    fn log_target_rejects_path_without_file_name() {
        assert!(matches!(
            log_target(Path::new("/")),
            Err(LoggingError::InvalidPath(_))
        ));
    }

    #[test]
    #[serial(tracing_init)]
    fn init_creates_log_directory_if_missing() {
        let temp_dir = TempDir::new().expect("temp dir");
        let log_dir = temp_dir.path().join("nested").join("logs");
        let log_file = log_dir.join("test.log");

        // May fail if another test installed the subscriber first; the
        // directory is created before that check.
        let _ = init(&log_file);

        assert!(log_dir.exists(), "Log directory should be created: {:?}", log_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let temp_dir = TempDir::new().expect("temp dir");
        let log_file = temp_dir.path().join("twice.log");

        let _ = init(&log_file);
        assert!(matches!(
            init(&log_file),
            Err(LoggingError::SubscriberAlreadySet)
        ));
    }

    #[test]
    #[serial(tracing_init)]
    fn unset_rust_log_uses_default_filter() {
        std::env::remove_var("RUST_LOG");
        assert_eq!(env_filter().to_string(), DEFAULT_FILTER);
    }
}
