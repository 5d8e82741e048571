//! Archive Layer
//!
//! Boundary with the round-robin archive engine plus the catalog built on it:
//!
//! - **types**: Typed introspection and fetch records
//! - **rrdtool**: Production store driving the `rrdtool` executable
//! - **catalog**: Discovery of archives and their fields under a root directory
//! - **error**: Error types
//!
//! The engine itself is never reimplemented here. Everything above this
//! module talks to it through [`ArchiveStore`].

pub mod catalog;
pub mod error;
pub mod rrdtool;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::ArchiveCatalog;
pub use error::{ArchiveError, ArchiveResult};
pub use rrdtool::RrdtoolStore;
pub use types::{ArchiveInfo, Consolidation, FetchRequest, FetchResult, ARCHIVE_EXTENSION};

use async_trait::async_trait;
use std::path::Path;

/// Read-only access to archive files
///
/// Implementations open the archive for the duration of one call and
/// release it before returning.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Describe an archive: step, last update and declared fields
    async fn info(&self, path: &Path) -> ArchiveResult<ArchiveInfo>;

    /// Consolidated range read over every field of the archive
    async fn fetch(&self, path: &Path, request: &FetchRequest) -> ArchiveResult<FetchResult>;
}
