//! Target Resolver
//!
//! Expands one metric identifier into the archive locations to sample.
//! Exact identifiers name at most one archive; patterns are expanded against
//! the filesystem and may fan out to many. Labels are always decoded from
//! the concrete archive path, never copied from the request.
//!
//! ```text
//! *:cpu:idle  →  <root>/*/cpu.rrd  →  east/cpu.rrd [idle], west/cpu.rrd [idle]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::ArchiveCatalog;
use crate::query::error::QueryResult;
use crate::query::identifier::{self, MetricIdentifier};

/// One field of one concrete archive file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLocation {
    /// Path of the archive file
    pub path: PathBuf,
    /// Identifier segments of the concrete file
    pub segments: Vec<String>,
    /// Field to read
    pub field: String,
}

impl ArchiveLocation {
    pub fn new(path: impl Into<PathBuf>, segments: Vec<String>, field: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            segments,
            field: field.into(),
        }
    }

    /// Externally visible identifier of this concrete location
    pub fn label(&self) -> String {
        identifier::encode(&self.segments, &self.field)
    }
}

/// Resolves identifiers against the archive root
pub struct TargetResolver {
    catalog: Arc<ArchiveCatalog>,
}

impl TargetResolver {
    pub fn new(catalog: Arc<ArchiveCatalog>) -> Self {
        Self { catalog }
    }

    /// Concrete locations for an identifier
    ///
    /// Paths that vanish between expansion and verification are skipped.
    pub async fn resolve(&self, id: &MetricIdentifier) -> QueryResult<Vec<ArchiveLocation>> {
        let relative = id.relative_path();

        if !id.is_confined() {
            tracing::warn!(target_id = %id, "Identifier does not name a path under the root");
            return Ok(Vec::new());
        }

        let candidates = match id {
            MetricIdentifier::Exact { .. } => vec![self.catalog.root().join(&relative)],
            MetricIdentifier::Pattern { .. } => self.catalog.matching(&relative).await?,
        };

        let mut locations = Vec::with_capacity(candidates.len());
        for path in candidates {
            if !is_file(&path).await {
                tracing::warn!(target_id = %id, path = %path.display(), "Archive does not exist");
                continue;
            }

            match self.catalog.segments_for(&path) {
                Some(segments) => locations.push(ArchiveLocation::new(path, segments, id.field())),
                None => {
                    tracing::warn!(target_id = %id, path = %path.display(), "Cannot derive identifier for archive");
                }
            }
        }

        tracing::debug!(target_id = %id, matched = locations.len(), "Resolved target");
        Ok(locations)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
