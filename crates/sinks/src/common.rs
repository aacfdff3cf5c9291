//! Common types shared by all sinks
//!
//! The object-safe sink interface and the error taxonomy.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// Object-safe interface implemented by every sink
///
/// Rotation, queueing, and level filtering compose around this trait rather
/// than inheriting from a base type. Records arrive pre-formatted: a sink
/// appends bytes and measures their length, it never reformats.
pub trait RecordSink: Send + Sync {
    /// Append one pre-formatted record
    fn write(&self, record: &[u8]) -> Result<()>;

    /// Flush buffered data to the OS
    fn flush(&self) -> Result<()>;
}

/// Errors produced by sinks
///
/// Only `Config` and `InvalidPath` are fatal, and only at construction.
/// `RotationFailed` and `CompressionFailed` are recovered locally by the
/// rotating sink and surfaced through its reporter; the active write path
/// stays available.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Rejected policy value, fatal at construction
    #[error("invalid rotation policy: {field} {message}")]
    Config {
        /// Offending policy field
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Base path has no usable file-name component
    #[error("invalid log path '{path}'")]
    InvalidPath {
        /// The rejected path
        path: String,
    },

    /// Open/write/flush failure on the active file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The rename chain could not complete after one retry; the active file
    /// was truncated to keep disk usage bounded
    #[error("rotation failed renaming '{src}' to '{target}': {source}")]
    RotationFailed {
        /// Slot that could not be moved
        src: PathBuf,
        /// Slot it was being moved onto
        target: PathBuf,
        /// Rename error from the retry
        #[source]
        source: std::io::Error,
    },

    /// Archiving a rotated file failed; the rotated file is retained
    #[error("compression failed for '{path}': {source}")]
    CompressionFailed {
        /// The rotated file that was being archived
        path: PathBuf,
        /// Underlying compression or I/O error
        #[source]
        source: std::io::Error,
    },

    /// The background worker thread is no longer running
    #[error("sink worker stopped")]
    WorkerStopped,
}

impl SinkError {
    /// Create a Config error
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Config {
            field,
            message: message.into(),
        }
    }

    /// Create an InvalidPath error
    pub fn invalid_path(path: &Path) -> Self {
        Self::InvalidPath {
            path: path.display().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
