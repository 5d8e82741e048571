//! In-memory archive store for tests
//!
//! Emulates the native fetch primitive: the window is widened to the
//! archive grid, one trailing unconsolidated slot is included, and slots
//! the archive holds no data for come back as NaN.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::{ArchiveError, ArchiveResult};
use super::types::{ArchiveInfo, FetchRequest, FetchResult};
use super::ArchiveStore;

/// One archive held in memory
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    pub info: ArchiveInfo,
    /// Timestamp of `rows[0]`
    pub origin: i64,
    /// Consolidated rows, one column per field in index order
    pub rows: Vec<Vec<f64>>,
}

impl MemoryArchive {
    /// Archive whose fields are indexed in the given order
    pub fn new(fields: &[&str], step: u64, last_update: i64) -> Self {
        Self {
            info: ArchiveInfo {
                step,
                last_update,
                fields: fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (f.to_string(), i))
                    .collect::<BTreeMap<_, _>>(),
            },
            origin: 0,
            rows: Vec::new(),
        }
    }

    /// Builder method: set consolidated rows starting at `origin`
    pub fn rows(mut self, origin: i64, rows: Vec<Vec<f64>>) -> Self {
        self.origin = origin;
        self.rows = rows;
        self
    }
}

/// Archive store backed by a map of paths
#[derive(Default)]
pub struct MemoryStore {
    archives: HashMap<PathBuf, MemoryArchive>,
    corrupt: HashMap<PathBuf, String>,
    fetches: Mutex<Vec<(PathBuf, FetchRequest)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an archive and create an empty file for it on disk
    pub fn insert(&mut self, path: impl AsRef<Path>, archive: MemoryArchive) {
        let path = path.as_ref().to_path_buf();
        touch(&path);
        self.archives.insert(path, archive);
    }

    /// Register a file that exists on disk but cannot be opened
    pub fn insert_corrupt(&mut self, path: impl AsRef<Path>, reason: &str) {
        let path = path.as_ref().to_path_buf();
        touch(&path);
        self.corrupt.insert(path, reason.to_string());
    }

    /// Every fetch issued so far
    pub fn fetches(&self) -> Vec<(PathBuf, FetchRequest)> {
        self.fetches.lock().unwrap().clone()
    }

    fn archive(&self, path: &Path) -> ArchiveResult<&MemoryArchive> {
        if let Some(reason) = self.corrupt.get(path) {
            return Err(ArchiveError::Parse {
                path: path.to_path_buf(),
                reason: reason.clone(),
            });
        }
        self.archives.get(path).ok_or_else(|| {
            ArchiveError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no archive at {:?}", path),
            ))
        })
    }
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"").unwrap();
}

#[async_trait]
impl ArchiveStore for MemoryStore {
    async fn info(&self, path: &Path) -> ArchiveResult<ArchiveInfo> {
        Ok(self.archive(path)?.info.clone())
    }

    async fn fetch(&self, path: &Path, request: &FetchRequest) -> ArchiveResult<FetchResult> {
        self.fetches
            .lock()
            .unwrap()
            .push((path.to_path_buf(), *request));

        let archive = self.archive(path)?;
        let step = archive.info.step as i64;
        let start = request.start.div_euclid(step) * step;
        let end = (request.end + step - 1).div_euclid(step) * step;
        let width = archive.info.fields.len();

        let rows = (0..=((end - start) / step))
            .map(|i| {
                let stamp = start + i * step;
                let offset = stamp - archive.origin;
                if offset < 0 || offset % step != 0 {
                    return vec![f64::NAN; width];
                }
                archive
                    .rows
                    .get((offset / step) as usize)
                    .cloned()
                    .unwrap_or_else(|| vec![f64::NAN; width])
            })
            .collect();

        let mut fields = vec![String::new(); width];
        for (name, &index) in &archive.info.fields {
            fields[index] = name.clone();
        }

        Ok(FetchResult {
            start,
            step: archive.info.step,
            fields,
            rows,
        })
    }
}
