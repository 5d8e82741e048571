//! Health Routes
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health
///
/// Full health status with component details. Does not rebuild the
/// search cache.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let archives_ok = check_archive_root(&state).await;
    let stats = state.search.stats().await;

    Json(HealthResponse {
        status: (if archives_ok { "healthy" } else { "degraded" }).to_string(),
        archives: (if archives_ok { "ok" } else { "unreadable" }).to_string(),
        search_cache_entries: stats.entries,
        search_cache_age_seconds: stats.built_at.map(|t| Utc::now().timestamp() - t),
        search_cache_rebuilds: stats.rebuilds,
        annotations_configured: state.annotations.is_configured(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Check that the archive root is a readable directory
async fn check_archive_root(state: &AppState) -> bool {
    match tokio::fs::read_dir(state.catalog.root()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(root = ?state.catalog.root(), error = %e, "Archive root unreadable");
            false
        }
    }
}
