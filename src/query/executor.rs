//! Query Executor
//!
//! Answers a batch of metric identifiers over one time window:
//!
//! ```text
//! identifier → resolve targets → (per location) describe → clamp window → sample → label
//! ```
//!
//! Failures are isolated per identifier and per location. A failing
//! location is left out of the series and reported in `failures`, so the
//! rest of a multi-target or wildcard query still succeeds.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::archive::{ArchiveCatalog, ArchiveStore};
use crate::query::error::{QueryError, QueryResult};
use crate::query::identifier::MetricIdentifier;
use crate::query::sampler::{Sample, Sampler};
use crate::query::target::{ArchiveLocation, TargetResolver};
use crate::query::window::{self, TimeWindow};

/// Samples of one concrete series
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Identifier of the concrete archive field (never a wildcard)
    pub label: String,
    pub samples: Vec<Sample>,
}

/// A location or identifier that was dropped from the answer
#[derive(Debug)]
pub struct LocationFailure {
    /// Identifier as requested
    pub target: String,
    /// Archive involved, if resolution got that far
    pub path: Option<PathBuf>,
    pub error: QueryError,
}

/// Result of answering a batch of identifiers
#[derive(Debug, Default)]
pub struct QueryOutcome {
    pub series: Vec<Series>,
    pub failures: Vec<LocationFailure>,
}

/// Query executor
pub struct QueryExecutor {
    catalog: Arc<ArchiveCatalog>,
    resolver: TargetResolver,
    sampler: Sampler,
}

impl QueryExecutor {
    /// Create an executor reading `step`-second samples scaled by `multiplier`
    pub fn new(
        catalog: Arc<ArchiveCatalog>,
        store: Arc<dyn ArchiveStore>,
        step: u64,
        multiplier: f64,
    ) -> Self {
        Self {
            resolver: TargetResolver::new(Arc::clone(&catalog)),
            sampler: Sampler::new(store, step, multiplier),
            catalog,
        }
    }

    /// Answer every identifier over `window`
    ///
    /// An exact identifier whose archive is missing still yields a series
    /// with no samples; a pattern that matches nothing yields no series.
    /// Identifiers with empty, `.` or `..` segments are malformed.
    pub async fn answer<S: AsRef<str>>(&self, targets: &[S], window: TimeWindow) -> QueryOutcome {
        let started = Instant::now();
        let mut outcome = QueryOutcome::default();

        for target in targets {
            let target = target.as_ref();

            let id = match MetricIdentifier::parse(target) {
                Ok(id) if id.is_confined() => id,
                Ok(_) => {
                    outcome.failures.push(LocationFailure {
                        target: target.to_string(),
                        path: None,
                        error: QueryError::MalformedIdentifier(target.to_string()),
                    });
                    continue;
                }
                Err(error) => {
                    outcome.failures.push(LocationFailure {
                        target: target.to_string(),
                        path: None,
                        error,
                    });
                    continue;
                }
            };

            let locations = match self.resolver.resolve(&id).await {
                Ok(locations) => locations,
                Err(error) => {
                    outcome.failures.push(LocationFailure {
                        target: target.to_string(),
                        path: None,
                        error,
                    });
                    continue;
                }
            };

            if locations.is_empty() && !id.is_pattern() {
                outcome.series.push(Series {
                    label: id.to_string(),
                    samples: Vec::new(),
                });
                continue;
            }

            for location in locations {
                match self.sample_location(&location, window).await {
                    Ok(samples) => outcome.series.push(Series {
                        label: location.label(),
                        samples,
                    }),
                    Err(error) => outcome.failures.push(LocationFailure {
                        target: target.to_string(),
                        path: Some(location.path),
                        error,
                    }),
                }
            }
        }

        tracing::debug!(
            targets = targets.len(),
            series = outcome.series.len(),
            failures = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query answered"
        );

        outcome
    }

    async fn sample_location(
        &self,
        location: &ArchiveLocation,
        requested: TimeWindow,
    ) -> QueryResult<Vec<Sample>> {
        let info = self
            .catalog
            .lookup(&location.path)
            .await
            .map_err(|source| QueryError::ArchiveOpenFailed {
                path: location.path.clone(),
                source,
            })?;

        let window = window::resolve(requested, info.last_update);
        self.sampler.fetch(location, &info, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::testing::{MemoryArchive, MemoryStore};
    use tempfile::{tempdir, TempDir};

    const T0: i64 = 1_494_763_900;

    fn executor(store: MemoryStore, dir: &TempDir) -> (Arc<MemoryStore>, QueryExecutor) {
        let store = Arc::new(store);
        let catalog = Arc::new(ArchiveCatalog::new(dir.path(), store.clone()));
        let executor = QueryExecutor::new(catalog, store.clone(), 10, 1.0);
        (store, executor)
    }

    #[tokio::test]
    async fn test_end_to_end_four_points() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.insert(
            dir.path().join("sample.rrd"),
            MemoryArchive::new(&["ClientJobsIdle", "ClientJobsRunning"], 10, T0 + 1000)
                .rows(T0, (0..10).map(|i| vec![i as f64 + 0.5, 1.0]).collect()),
        );
        let (_store, executor) = executor(store, &dir);

        let outcome = executor
            .answer(&["sample:ClientJobsIdle"], TimeWindow::new(T0, T0 + 40))
            .await;

        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.series.len(), 1);
        let series = &outcome.series[0];
        assert_eq!(series.label, "sample:ClientJobsIdle");
        assert_eq!(series.samples.len(), 4);
        for pair in series.samples.windows(2) {
            assert_eq!(pair[1].timestamp_millis() - pair[0].timestamp_millis(), 10_000);
        }
        assert_eq!(series.samples[0], Sample::new(0.5, T0));
    }

    #[tokio::test]
    async fn test_multiplier_applied() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.insert(
            dir.path().join("sample.rrd"),
            MemoryArchive::new(&["value"], 10, T0 + 1000).rows(T0, vec![vec![2.0]; 10]),
        );
        let store = Arc::new(store);
        let catalog = Arc::new(ArchiveCatalog::new(dir.path(), store.clone()));
        let executor = QueryExecutor::new(catalog, store, 10, 100.0);

        let outcome = executor
            .answer(&["sample:value"], TimeWindow::new(T0, T0 + 20))
            .await;

        assert!(outcome.series[0].samples.iter().all(|s| s.value == 200.0));
    }

    #[tokio::test]
    async fn test_wildcard_labels() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        for host in ["east", "west"] {
            store.insert(
                dir.path().join(host).join("cpu.rrd"),
                MemoryArchive::new(&["idle"], 10, T0 + 1000).rows(T0, vec![vec![1.0]; 10]),
            );
        }
        let (_store, executor) = executor(store, &dir);

        let outcome = executor
            .answer(&["*:cpu:idle"], TimeWindow::new(T0, T0 + 30))
            .await;
        let labels: Vec<&str> = outcome.series.iter().map(|s| s.label.as_str()).collect();

        assert_eq!(labels, vec!["east:cpu:idle", "west:cpu:idle"]);
    }

    #[tokio::test]
    async fn test_window_clamped_per_location() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.insert(
            dir.path().join("fresh.rrd"),
            MemoryArchive::new(&["v"], 10, T0 + 100),
        );
        store.insert(
            dir.path().join("stale.rrd"),
            MemoryArchive::new(&["v"], 10, T0 + 30),
        );
        let (store, executor) = executor(store, &dir);

        executor
            .answer(&["stale:v", "fresh:v"], TimeWindow::new(T0, T0 + 60))
            .await;

        let windows: Vec<(i64, i64)> = store
            .fetches()
            .iter()
            .map(|(_, r)| (r.start, r.end))
            .collect();
        assert_eq!(windows, vec![(T0, T0 + 30), (T0, T0 + 60)]);
    }

    #[tokio::test]
    async fn test_missing_exact_vs_unmatched_pattern() {
        let dir = tempdir().unwrap();
        let (_store, executor) = executor(MemoryStore::new(), &dir);

        let outcome = executor
            .answer(&["nowhere:value", "no-*:value"], TimeWindow::new(T0, T0 + 60))
            .await;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.series[0].label, "nowhere:value");
        assert!(outcome.series[0].samples.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_partial_failures() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.insert(
            dir.path().join("good").join("load.rrd"),
            MemoryArchive::new(&["shortterm"], 10, T0 + 1000).rows(T0, vec![vec![0.3]; 10]),
        );
        store.insert(
            dir.path().join("other").join("load.rrd"),
            MemoryArchive::new(&["longterm"], 10, T0 + 1000),
        );
        store.insert_corrupt(dir.path().join("broken").join("load.rrd"), "bad magic");
        let (_store, executor) = executor(store, &dir);

        let outcome = executor
            .answer(&["*:load:shortterm", "malformed"], TimeWindow::new(T0, T0 + 30))
            .await;

        assert_eq!(outcome.series.len(), 1);
        assert_eq!(outcome.series[0].label, "good:load:shortterm");

        assert_eq!(outcome.failures.len(), 3);
        assert!(outcome.failures.iter().any(|f| matches!(f.error, QueryError::ArchiveOpenFailed { .. })));
        assert!(outcome.failures.iter().any(|f| matches!(f.error, QueryError::FieldNotFound { .. })));
        assert!(outcome
            .failures
            .iter()
            .any(|f| matches!(f.error, QueryError::MalformedIdentifier(_)) && f.path.is_none()));
    }

    #[tokio::test]
    async fn test_unconfined_identifiers_are_malformed() {
        let dir = tempdir().unwrap();
        let mut store = MemoryStore::new();
        store.insert(
            dir.path().join("east").join("cpu.rrd"),
            MemoryArchive::new(&["idle"], 10, T0 + 1000).rows(T0, vec![vec![1.0]; 10]),
        );
        let (_store, executor) = executor(store, &dir);

        let outcome = executor
            .answer(
                &["east::cpu:idle", "east:./cpu:idle", "..:*:idle", "east:cpu:idle"],
                TimeWindow::new(T0, T0 + 30),
            )
            .await;

        let labels: Vec<&str> = outcome.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["east:cpu:idle"]);
        assert_eq!(outcome.failures.len(), 3);
        assert!(outcome
            .failures
            .iter()
            .all(|f| matches!(f.error, QueryError::MalformedIdentifier(_))));
    }

    #[tokio::test]
    async fn test_empty_request() {
        let dir = tempdir().unwrap();
        let (_store, executor) = executor(MemoryStore::new(), &dir);
        let outcome = executor.answer::<&str>(&[], TimeWindow::new(0, 10)).await;
        assert!(outcome.series.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
