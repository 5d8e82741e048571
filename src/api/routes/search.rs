//! Search Routes
//!
//! - POST /search - Identifiers containing a substring

use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::api::dto::SearchRequest;
use crate::api::error::ApiResult;
use crate::api::routes::decode_body;
use crate::api::state::AppState;

/// POST /search
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Vec<String>>> {
    let req: SearchRequest = decode_body(&body)?;

    let identifiers = state.search.search(&req.target).await?;
    tracing::debug!(filter = %req.target, matches = identifiers.len(), "Search answered");

    Ok(Json(identifiers))
}
