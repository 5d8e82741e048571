//! Annotations
//!
//! Point-in-time event markers read from a CSV file with the columns
//! `time,title,tags,text` (`time` in unix milliseconds). The file is read
//! fresh on every lookup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::query::TimeWindow;

/// One event marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Unix timestamp in milliseconds
    pub time: i64,
    pub title: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub text: String,
}

/// Outcome of an annotation lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationLookup {
    /// No annotation store is configured
    NotConfigured,
    /// Records inside the requested window
    Events(Vec<AnnotationRecord>),
}

/// Errors reading the annotation store
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("IO error reading annotations {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in annotations {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// CSV-backed annotation store
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    path: Option<PathBuf>,
}

impl AnnotationStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Check if a store file is configured
    pub fn is_configured(&self) -> bool {
        self.path.is_some()
    }

    /// Records whose time falls inside `window`
    pub fn lookup(&self, window: TimeWindow) -> Result<AnnotationLookup, AnnotationError> {
        let Some(path) = &self.path else {
            return Ok(AnnotationLookup::NotConfigured);
        };

        let records = load(path)?;
        Ok(AnnotationLookup::Events(filter(records, window)))
    }
}

/// Read every record from a CSV file
pub fn load(path: &Path) -> Result<Vec<AnnotationRecord>, AnnotationError> {
    let file = std::fs::File::open(path).map_err(|source| AnnotationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    reader
        .deserialize()
        .collect::<Result<Vec<AnnotationRecord>, _>>()
        .map_err(|source| AnnotationError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Keep records with `start <= time <= end`, bounds scaled to milliseconds
pub fn filter(records: Vec<AnnotationRecord>, window: TimeWindow) -> Vec<AnnotationRecord> {
    let (start, end) = window.to_millis();
    records
        .into_iter()
        .filter(|r| start <= r.time && r.time <= end)
        .collect()
}
