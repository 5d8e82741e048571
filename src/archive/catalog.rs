//! Archive Catalog
//!
//! Discovers archive files under a root directory and lists the metric
//! identifiers they provide, one per (archive, field) pair.
//!
//! Enumeration opens every archive, so it is the expensive call; the search
//! cache sits in front of it.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::error::{ArchiveError, ArchiveResult};
use super::types::{ArchiveInfo, ARCHIVE_EXTENSION};
use super::ArchiveStore;
use crate::query::identifier;

/// Catalog of the archives under one root directory
pub struct ArchiveCatalog {
    root: PathBuf,
    store: Arc<dyn ArchiveStore>,
}

impl ArchiveCatalog {
    pub fn new(root: impl Into<PathBuf>, store: Arc<dyn ArchiveStore>) -> Self {
        Self {
            root: root.into(),
            store,
        }
    }

    /// Root directory of the catalog
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List every `segments:field` identifier under the root
    ///
    /// Archives that cannot be opened are logged and skipped.
    pub async fn enumerate(&self) -> ArchiveResult<Vec<String>> {
        let pattern = PathBuf::from("**").join(format!("*.{}", ARCHIVE_EXTENSION));
        let paths = self.matching(&pattern).await?;

        let mut identifiers = Vec::new();
        let mut skipped = 0usize;

        for path in &paths {
            let Some(segments) = self.segments_for(path) else {
                tracing::warn!(path = %path.display(), "Archive path outside of root, skipping");
                skipped += 1;
                continue;
            };

            match self.store.info(path).await {
                Ok(info) => {
                    identifiers.extend(info.field_names().map(|f| identifier::encode(&segments, f)));
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot read archive, skipping");
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            root = %self.root.display(),
            archives = paths.len(),
            skipped,
            identifiers = identifiers.len(),
            "Enumerated archive catalog"
        );

        Ok(identifiers)
    }

    /// Describe a single archive
    pub async fn lookup(&self, path: &Path) -> ArchiveResult<ArchiveInfo> {
        self.store.info(path).await
    }

    /// Existing archive files matching a pattern relative to the root
    ///
    /// The root itself is matched literally; only `relative` may carry
    /// wildcards, and it must not leave the root (`..`, absolute paths).
    /// Results come back in path order.
    pub async fn matching(&self, relative: &Path) -> ArchiveResult<Vec<PathBuf>> {
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ArchiveError::Pattern(format!(
                "pattern {:?} leaves the archive root",
                relative
            )));
        }

        let root = self.root.to_str().ok_or_else(|| {
            ArchiveError::Pattern(format!("archive root {:?} is not valid UTF-8", self.root))
        })?;
        let pattern = PathBuf::from(glob::Pattern::escape(root))
            .join(relative)
            .to_string_lossy()
            .into_owned();

        tokio::task::spawn_blocking(move || glob_files(&pattern))
            .await
            .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
    }

    /// Identifier segments of an archive path under the root
    pub fn segments_for(&self, path: &Path) -> Option<Vec<String>> {
        identifier::segments_of(path.strip_prefix(&self.root).ok()?)
    }
}

fn glob_files(pattern: &str) -> ArchiveResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in glob::glob(pattern)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %e.path().display(), error = %e.error(), "Cannot read directory entry");
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::testing::{MemoryArchive, MemoryStore};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_enumerate_nested() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut store = MemoryStore::new();
        store.insert(root.join("sample.rrd"), MemoryArchive::new(&["ClientJobsIdle", "ClientJobsRunning"], 10, 0));
        store.insert(root.join("east/cpu.rrd"), MemoryArchive::new(&["idle", "user"], 10, 0));
        std::fs::write(root.join("notes.txt"), "not an archive").unwrap();

        let catalog = ArchiveCatalog::new(root, Arc::new(store));
        let mut ids = catalog.enumerate().await.unwrap();
        ids.sort();

        assert_eq!(
            ids,
            vec![
                "east:cpu:idle",
                "east:cpu:user",
                "sample:ClientJobsIdle",
                "sample:ClientJobsRunning",
            ]
        );
    }

    #[tokio::test]
    async fn test_enumerate_skips_corrupt_archive() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut store = MemoryStore::new();
        store.insert(root.join("good.rrd"), MemoryArchive::new(&["value"], 10, 0));
        store.insert_corrupt(root.join("bad.rrd"), "truncated header");

        let catalog = ArchiveCatalog::new(root, Arc::new(store));
        let ids = catalog.enumerate().await.unwrap();

        assert_eq!(ids, vec!["good:value"]);
    }

    #[tokio::test]
    async fn test_enumerate_ignores_archive_named_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("odd.rrd")).unwrap();

        let catalog = ArchiveCatalog::new(root, Arc::new(MemoryStore::new()));
        assert!(catalog.enumerate().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matching_escapes_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("data[1]");
        let mut store = MemoryStore::new();
        store.insert(root.join("a.rrd"), MemoryArchive::new(&["v"], 10, 0));

        let catalog = ArchiveCatalog::new(&root, Arc::new(store));
        let found = catalog.matching(Path::new("*.rrd")).await.unwrap();

        assert_eq!(found, vec![root.join("a.rrd")]);
        assert_eq!(catalog.segments_for(&found[0]), Some(vec!["a".to_string()]));
    }

    #[tokio::test]
    async fn test_matching_refuses_to_leave_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        let mut store = MemoryStore::new();
        store.insert(root.join("inside.rrd"), MemoryArchive::new(&["v"], 10, 0));
        store.insert(dir.path().join("outside.rrd"), MemoryArchive::new(&["v"], 10, 0));

        let catalog = ArchiveCatalog::new(&root, Arc::new(store));
        let escaping = [
            PathBuf::from("../*.rrd"),
            PathBuf::from("./../*.rrd"),
            dir.path().join("*.rrd"),
        ];
        for pattern in &escaping {
            assert!(
                matches!(catalog.matching(pattern).await, Err(ArchiveError::Pattern(_))),
                "{:?} should be refused",
                pattern
            );
        }
    }

    #[tokio::test]
    async fn test_lookup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.rrd");
        let mut store = MemoryStore::new();
        store.insert(&path, MemoryArchive::new(&["v"], 10, 1234));

        let catalog = ArchiveCatalog::new(dir.path(), Arc::new(store));
        assert_eq!(catalog.lookup(&path).await.unwrap().last_update, 1234);
        assert!(catalog.lookup(&dir.path().join("b.rrd")).await.is_err());
    }
}
