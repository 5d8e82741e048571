//! Query Pipeline
//!
//! Turns metric identifiers and a time window into labelled sample series:
//!
//! - **identifier**: Identifier ↔ (segments, field) ↔ archive path codec
//! - **target**: Expand an identifier (possibly a wildcard) into archive locations
//! - **window**: Clamp a window to an archive's last update
//! - **sampler**: Read and clean one field of one archive
//! - **executor**: Orchestrate the above for a batch of identifiers
//! - **search**: TTL cache of every identifier the catalog knows about
//!
//! # Pipeline
//!
//! ```text
//! "*:cpu:idle" ─ resolve ─┬─ east/cpu.rrd ─ clamp ─ sample ─ "east:cpu:idle"
//!                         └─ west/cpu.rrd ─ clamp ─ sample ─ "west:cpu:idle"
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rrdserver::archive::{ArchiveCatalog, RrdtoolStore};
//! use rrdserver::query::{QueryExecutor, TimeWindow};
//! use std::sync::Arc;
//!
//! let store = Arc::new(RrdtoolStore::default());
//! let catalog = Arc::new(ArchiveCatalog::new("./sample", store.clone()));
//! let executor = QueryExecutor::new(catalog, store, 10, 1.0);
//!
//! let outcome = executor.answer(&["*:cpu:idle"], TimeWindow::new(start, end)).await;
//! ```

pub mod error;
pub mod executor;
pub mod identifier;
pub mod sampler;
pub mod search;
pub mod target;
pub mod window;

pub use error::{QueryError, QueryResult};
pub use executor::{LocationFailure, QueryExecutor, QueryOutcome, Series};
pub use identifier::MetricIdentifier;
pub use sampler::{Sample, Sampler};
pub use search::{SearchCache, SearchCacheStats, SearchSnapshot};
pub use target::{ArchiveLocation, TargetResolver};
pub use window::TimeWindow;
