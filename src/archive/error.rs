//! Archive backend error types
//!
//! Errors raised at the boundary with the round-robin archive engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to the archive engine
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// I/O operation failed (spawning the tool, reading a file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive tool exited unsuccessfully
    #[error("{command} failed for {path:?} ({status}): {stderr}")]
    Command {
        command: String,
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The archive tool produced output we could not understand
    #[error("Cannot parse archive output for {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Archive discovery pattern was invalid
    #[error("Invalid archive pattern: {0}")]
    Pattern(String),
}

impl From<glob::PatternError> for ArchiveError {
    fn from(err: glob::PatternError) -> Self {
        ArchiveError::Pattern(err.to_string())
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
