//! Annotation Routes
//!
//! - POST /annotations - Event markers inside a time range

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::annotations::AnnotationLookup;
use crate::api::dto::{AnnotationRequest, AnnotationResponse, MessageResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::decode_body;
use crate::api::state::AppState;

/// POST /annotations
pub async fn annotations(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Response> {
    if !state.annotations.is_configured() {
        return Ok(Json(MessageResponse::new("Not configured")).into_response());
    }

    let req: AnnotationRequest = decode_body(&body)?;
    let window = req.range.window()?;

    let store = Arc::clone(&state.annotations);
    let lookup = tokio::task::spawn_blocking(move || store.lookup(window))
        .await
        .map_err(|e| ApiError::Internal(format!("Annotation task failed: {}", e)))??;

    match lookup {
        AnnotationLookup::NotConfigured => {
            Ok(Json(MessageResponse::new("Not configured")).into_response())
        }
        AnnotationLookup::Events(records) => {
            tracing::debug!(
                subscription = %req.annotation.name,
                events = records.len(),
                "Annotations answered"
            );
            let body: Vec<AnnotationResponse> =
                records.into_iter().map(AnnotationResponse::from).collect();
            Ok(Json(body).into_response())
        }
    }
}
