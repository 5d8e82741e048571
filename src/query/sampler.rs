//! Sampler
//!
//! Reads one field of one archive over a window and turns the raw slot grid
//! into clean samples:
//!
//! 1. Look up the field's column index
//! 2. Walk every slot except the last, which is never a completed interval
//! 3. Drop NaN slots, scale the rest by the configured multiplier
//! 4. Advance the timestamp by the native step after every slot, dropped or not

use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::sync::Arc;

use crate::archive::{ArchiveInfo, ArchiveStore, FetchRequest, FetchResult};
use crate::query::error::{QueryError, QueryResult};
use crate::query::target::ArchiveLocation;
use crate::query::window::TimeWindow;

/// One consolidated value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    /// Unix timestamp in seconds
    pub timestamp: i64,
}

impl Sample {
    pub fn new(value: f64, timestamp: i64) -> Self {
        Self { value, timestamp }
    }

    /// Timestamp in milliseconds, saturating at the `i64` bounds
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.saturating_mul(1000)
    }
}

/// Serialized as a `[value, timestampMillis]` pair
impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.value)?;
        tuple.serialize_element(&(self.timestamp_millis() as f64))?;
        tuple.end()
    }
}

/// Turn the slots of one field column into samples
pub fn extract_samples(result: &FetchResult, field_index: usize, multiplier: f64) -> Vec<Sample> {
    let completed = result.row_count().saturating_sub(1);
    let mut samples = Vec::with_capacity(completed);
    let mut timestamp = result.start;
    let step = i64::try_from(result.step).unwrap_or(i64::MAX);

    for row in 0..completed {
        let value = result.value_at(field_index, row);
        if !value.is_nan() {
            samples.push(Sample::new(value * multiplier, timestamp));
        }
        timestamp = timestamp.saturating_add(step);
    }

    samples
}

/// Reads samples for resolved archive locations
pub struct Sampler {
    store: Arc<dyn ArchiveStore>,
    /// Requested resolution in seconds
    step: u64,
    /// Unit scaling applied to every value
    multiplier: f64,
}

impl Sampler {
    pub fn new(store: Arc<dyn ArchiveStore>, step: u64, multiplier: f64) -> Self {
        Self {
            store,
            step,
            multiplier,
        }
    }

    /// Fetch samples for `location` over an already-clamped window
    pub async fn fetch(
        &self,
        location: &ArchiveLocation,
        info: &ArchiveInfo,
        window: TimeWindow,
    ) -> QueryResult<Vec<Sample>> {
        let field_index =
            info.field_index(&location.field)
                .ok_or_else(|| QueryError::FieldNotFound {
                    field: location.field.clone(),
                    path: location.path.clone(),
                })?;

        let request = FetchRequest::average(window.start, window.end, self.step);
        let result = self
            .store
            .fetch(&location.path, &request)
            .await
            .map_err(|source| QueryError::ArchiveFetchFailed {
                path: location.path.clone(),
                source,
            })?;

        let samples = extract_samples(&result, field_index, self.multiplier);

        tracing::debug!(
            path = %location.path.display(),
            field = %location.field,
            slots = result.row_count(),
            samples = samples.len(),
            "Sampled archive"
        );

        Ok(samples)
    }
}
