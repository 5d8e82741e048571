//! Search Cache
//!
//! Holds the full list of metric identifiers produced by the archive
//! catalog and answers substring searches against it. The list is rebuilt
//! wholesale when it is empty or older than the TTL.
//!
//! Rebuilds are serialized by a dedicated async mutex, so at most one is in
//! flight. The current snapshot lives in a separate slot that is only locked
//! long enough to clone or swap an `Arc`; reads and [`SearchCache::stats`]
//! never wait on a rebuild. Snapshots are immutable and swapped as a whole.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::archive::ArchiveCatalog;
use crate::query::error::QueryResult;

/// Immutable contents of the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub identifiers: Vec<String>,
    /// Wall-clock time of the rebuild (unix seconds)
    pub built_at: i64,
}

/// Point-in-time statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCacheStats {
    pub entries: usize,
    pub built_at: Option<i64>,
    pub rebuilds: u64,
}

/// TTL-bounded cache of catalog identifiers
pub struct SearchCache {
    catalog: Arc<ArchiveCatalog>,
    /// Time to live in seconds
    ttl_secs: i64,
    /// Current snapshot; held only to clone or replace the `Arc`
    snapshot: RwLock<Option<Arc<SearchSnapshot>>>,
    /// Held for the whole of a rebuild
    rebuild: Mutex<()>,
    rebuilds: AtomicU64,
}

impl SearchCache {
    pub fn new(catalog: Arc<ArchiveCatalog>, ttl_secs: u64) -> Self {
        Self {
            catalog,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
            snapshot: RwLock::new(None),
            rebuild: Mutex::new(()),
            rebuilds: AtomicU64::new(0),
        }
    }

    /// Identifiers containing `filter` (all of them when `filter` is empty)
    pub async fn search(&self, filter: &str) -> QueryResult<Vec<String>> {
        self.search_at(filter, Utc::now().timestamp()).await
    }

    /// Same as [`search`](Self::search) with an explicit clock reading
    pub async fn search_at(&self, filter: &str, now: i64) -> QueryResult<Vec<String>> {
        let snapshot = self.current(now).await?;

        Ok(if filter.is_empty() {
            snapshot.identifiers.clone()
        } else {
            snapshot
                .identifiers
                .iter()
                .filter(|id| id.contains(filter))
                .cloned()
                .collect()
        })
    }

    /// Current snapshot, rebuilding it first if it is empty or expired
    async fn current(&self, now: i64) -> QueryResult<Arc<SearchSnapshot>> {
        if let Some(snapshot) = self.fresh(now).await {
            return Ok(snapshot);
        }

        let _rebuilding = self.rebuild.lock().await;

        // Another caller may have rebuilt while we waited
        if let Some(snapshot) = self.fresh(now).await {
            return Ok(snapshot);
        }

        tracing::info!("Updating search cache");
        let identifiers = self.catalog.enumerate().await?;
        let snapshot = Arc::new(SearchSnapshot {
            identifiers,
            built_at: now,
        });
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        self.rebuilds.fetch_add(1, Ordering::Relaxed);

        Ok(snapshot)
    }

    /// The stored snapshot if it is non-empty and within its TTL
    async fn fresh(&self, now: i64) -> Option<Arc<SearchSnapshot>> {
        let guard = self.snapshot.read().await;
        let snapshot = guard.as_ref()?;
        let expired = snapshot.built_at.saturating_add(self.ttl_secs) < now;
        (!snapshot.identifiers.is_empty() && !expired).then(|| Arc::clone(snapshot))
    }

    /// Cache statistics (does not trigger or wait for a rebuild)
    pub async fn stats(&self) -> SearchCacheStats {
        let snapshot = self.snapshot.read().await.clone();
        SearchCacheStats {
            entries: snapshot.as_ref().map(|s| s.identifiers.len()).unwrap_or(0),
            built_at: snapshot.as_ref().map(|s| s.built_at),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
        }
    }
}
