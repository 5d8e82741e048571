//! Typed records exchanged with the archive engine
//!
//! - `ArchiveInfo`: what an archive declares about itself
//! - `FetchRequest`: a consolidated range read
//! - `FetchResult`: the raw slot grid returned by a range read

use std::collections::BTreeMap;

/// File extension of round-robin archives
pub const ARCHIVE_EXTENSION: &str = "rrd";

/// Introspection record for one archive file
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveInfo {
    /// Native step of the archive in seconds
    pub step: u64,
    /// Most recent timestamp (unix seconds) with authoritative data
    pub last_update: i64,
    /// Field (data source) name → column index
    pub fields: BTreeMap<String, usize>,
}

impl ArchiveInfo {
    /// Column index of a field, if the archive declares it
    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.get(field).copied()
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Consolidation function requested from the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consolidation {
    /// Arithmetic mean across the step interval
    Average,
}

impl Consolidation {
    /// Name understood by the archive engine
    pub fn as_str(&self) -> &'static str {
        match self {
            Consolidation::Average => "AVERAGE",
        }
    }
}

/// A consolidated range read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub consolidation: Consolidation,
    /// Start of the window (unix seconds)
    pub start: i64,
    /// End of the window (unix seconds)
    pub end: i64,
    /// Requested resolution in seconds
    pub resolution: u64,
}

impl FetchRequest {
    /// Averaged read of `[start, end]` at `resolution`
    pub fn average(start: i64, end: i64, resolution: u64) -> Self {
        Self {
            consolidation: Consolidation::Average,
            start,
            end,
            resolution,
        }
    }
}

/// Raw slots returned by a range read
///
/// Slot `i` is stamped `start + i * step`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Timestamp of the first slot (unix seconds)
    pub start: i64,
    /// Step between slots in seconds
    pub step: u64,
    /// Field names in column order
    pub fields: Vec<String>,
    /// One row per slot, one column per field
    pub rows: Vec<Vec<f64>>,
}

impl FetchResult {
    /// Number of slots returned
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Value of a field column at a slot; NaN when the row is short
    pub fn value_at(&self, field_index: usize, row: usize) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(field_index))
            .copied()
            .unwrap_or(f64::NAN)
    }
}
