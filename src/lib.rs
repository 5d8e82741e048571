//! # rrdserver
//!
//! Serves a directory tree of round-robin archives to time-series
//! dashboards over a small JSON protocol.
//!
//! Every field of every archive under the root is addressed by an
//! identifier such as `web01:cpu:percent-idle`: the archive's path
//! relative to the root (without the `.rrd` extension) split into
//! segments, then the field name, all joined by `:`. Segments may carry
//! shell wildcards (`*:cpu:percent-idle`) to fan one identifier out into
//! many series.
//!
//! ## Modules
//!
//! - [`archive`]: Archive store boundary, rrdtool backend and catalog
//! - [`query`]: Identifiers, time windows, sampling and the search cache
//! - [`annotations`]: CSV-backed event markers
//! - [`api`]: HTTP API server with Axum
//! - [`config`]: File, environment and flag configuration

pub mod annotations;
pub mod api;
pub mod archive;
pub mod config;
pub mod query;

pub use annotations::{AnnotationError, AnnotationLookup, AnnotationRecord, AnnotationStore};

pub use api::{build_router, serve, ApiError, AppState};

pub use archive::{ArchiveCatalog, ArchiveError, ArchiveInfo, ArchiveStore, RrdtoolStore};

pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};

pub use query::{
    MetricIdentifier, QueryError, QueryExecutor, QueryOutcome, Sample, SearchCache, Series,
    TimeWindow,
};
