//! Query Routes
//!
//! - POST /query - Sample the requested identifiers over a time range

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{QueryRequest, QueryResponse};
use crate::api::error::ApiResult;
use crate::api::routes::decode_body;
use crate::api::state::AppState;

/// POST /query
///
/// Identifiers that fail are logged and left out; the remaining series
/// are still returned.
pub async fn query(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Vec<QueryResponse>>> {
    let req: QueryRequest = decode_body(&body)?;
    let window = req.range.window()?;
    let targets = req.active_targets();

    let outcome = state.executor.answer(&targets, window).await;

    for failure in &outcome.failures {
        tracing::warn!(
            target_id = %failure.target,
            path = ?failure.path,
            error = %failure.error,
            "Target dropped from query"
        );
    }

    Ok(Json(
        outcome.series.into_iter().map(QueryResponse::from).collect(),
    ))
}
