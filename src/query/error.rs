//! Query error types
//!
//! Defines all error conditions that can occur while resolving and sampling
//! metric identifiers.

use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;

/// Errors that can occur during query operations
#[derive(Error, Debug)]
pub enum QueryError {
    /// Identifier has no field segment
    #[error("Malformed identifier '{0}': expected segment[:segment...]:field")]
    MalformedIdentifier(String),

    /// Requested field is not declared by a matched archive
    #[error("Field '{field}' not found in {path:?}")]
    FieldNotFound { field: String, path: PathBuf },

    /// Archive could not be opened or described
    #[error("Cannot open archive {path:?}: {source}")]
    ArchiveOpenFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// Archive range read failed
    #[error("Cannot fetch from archive {path:?}: {source}")]
    ArchiveFetchFailed {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// Catalog enumeration failed as a whole
    #[error("Catalog error: {0}")]
    Catalog(#[from] ArchiveError),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::MalformedIdentifier("cpu".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed identifier 'cpu': expected segment[:segment...]:field"
        );

        let err = QueryError::FieldNotFound {
            field: "idle".to_string(),
            path: PathBuf::from("east/cpu.rrd"),
        };
        assert_eq!(err.to_string(), "Field 'idle' not found in \"east/cpu.rrd\"");
    }
}
