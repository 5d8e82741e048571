//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::annotations::AnnotationStore;
use crate::archive::{ArchiveCatalog, ArchiveStore};
use crate::config::ServerConfig;
use crate::query::{QueryExecutor, SearchCache};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalog of archives under the configured root
    pub catalog: Arc<ArchiveCatalog>,
    /// Query executor for sampling targets
    pub executor: Arc<QueryExecutor>,
    /// Identifier cache behind the search endpoint
    pub search: Arc<SearchCache>,
    /// Annotation store (possibly unconfigured)
    pub annotations: Arc<AnnotationStore>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Wire every component to one archive store
    pub fn new(config: &ServerConfig, store: Arc<dyn ArchiveStore>) -> Self {
        let catalog = Arc::new(ArchiveCatalog::new(&config.rrd_path, Arc::clone(&store)));
        let executor = Arc::new(QueryExecutor::new(
            Arc::clone(&catalog),
            store,
            config.step_secs,
            config.multiplier,
        ));
        let search = Arc::new(SearchCache::new(
            Arc::clone(&catalog),
            config.search_cache_secs,
        ));

        Self {
            catalog,
            executor,
            search,
            annotations: Arc::new(AnnotationStore::new(config.annotation_file.clone())),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
