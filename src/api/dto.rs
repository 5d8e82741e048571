//! Data Transfer Objects
//!
//! Request and response types for the dashboard JSON protocol.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::annotations::AnnotationRecord;
use crate::api::error::{ApiError, ApiResult};
use crate::query::{Sample, Series, TimeWindow};

// ============================================
// SHARED DTOs
// ============================================

/// Absolute time range as sent by the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct RangeDto {
    /// Start time (RFC 3339 or epoch milliseconds)
    pub from: String,
    /// End time (RFC 3339 or epoch milliseconds)
    pub to: String,
}

impl RangeDto {
    /// Parse the range into a window in whole seconds
    pub fn window(&self) -> ApiResult<TimeWindow> {
        let from = parse_timestamp(&self.from)?;
        let to = parse_timestamp(&self.to)?;

        if from > to {
            return Err(ApiError::Validation(
                "range.from must not be after range.to".to_string(),
            ));
        }

        Ok(TimeWindow::from_datetimes(from, to))
    }
}

/// Relative range as typed by the user (informational only)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRangeDto {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

/// Parse a timestamp string
fn parse_timestamp(s: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ms) = s.parse::<i64>() {
        if let Some(dt) = Utc.timestamp_millis_opt(ms).single() {
            return Ok(dt);
        }
    }

    Err(ApiError::Validation(format!("Cannot parse timestamp: {:?}", s)))
}

/// Plain message body (`hello`, `Not configured`)
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================
// SEARCH DTOs
// ============================================

/// Search request
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    /// Substring to look for; empty returns every identifier
    #[serde(default)]
    pub target: String,
}

// ============================================
// QUERY DTOs
// ============================================

/// Query request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    #[serde(default)]
    pub panel_id: Option<i64>,
    /// Time range to query
    pub range: RangeDto,
    #[serde(default)]
    pub range_raw: Option<RawRangeDto>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub interval_ms: Option<i64>,
    /// Identifiers to sample
    #[serde(default)]
    pub targets: Vec<TargetDto>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_data_points: Option<i64>,
}

impl QueryRequest {
    /// Identifiers that should be answered
    pub fn active_targets(&self) -> Vec<&str> {
        self.targets
            .iter()
            .filter(|t| !t.hide && !t.target.is_empty())
            .map(|t| t.target.as_str())
            .collect()
    }
}

/// One requested identifier
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDto {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub hide: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// One series in the query response
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    /// Concrete identifier of the series
    pub target: String,
    /// `[value, timestampMillis]` pairs
    pub datapoints: Vec<Sample>,
}

impl From<Series> for QueryResponse {
    fn from(series: Series) -> Self {
        Self {
            target: series.label,
            datapoints: series.samples,
        }
    }
}

// ============================================
// ANNOTATION DTOs
// ============================================

/// Annotation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRequest {
    pub range: RangeDto,
    #[serde(default)]
    pub range_raw: Option<RawRangeDto>,
    #[serde(default)]
    pub annotation: AnnotationQueryDto,
}

/// Annotation subscription metadata
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationQueryDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub datasource: String,
    #[serde(default)]
    pub icon_color: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub query: String,
}

/// One annotation in the response
#[derive(Debug, Serialize)]
pub struct AnnotationResponse {
    pub annotation: String,
    /// Unix timestamp in milliseconds
    pub time: i64,
    pub title: String,
    pub tags: String,
    pub text: String,
}

impl From<AnnotationRecord> for AnnotationResponse {
    fn from(record: AnnotationRecord) -> Self {
        Self {
            annotation: "annotation".to_string(),
            time: record.time,
            title: record.title,
            tags: record.tags,
            text: record.text,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Archive root status: ok, unreadable
    pub archives: String,
    /// Identifiers currently in the search cache
    pub search_cache_entries: usize,
    /// Seconds since the search cache was rebuilt
    pub search_cache_age_seconds: Option<i64>,
    /// Number of search cache rebuilds so far
    pub search_cache_rebuilds: u64,
    /// Whether an annotation store is configured
    pub annotations_configured: bool,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
