//! API Routes
//!
//! Route handlers organized by functionality.

pub mod annotations;
pub mod health;
pub mod query;
pub mod search;

use axum::body::Bytes;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::dto::MessageResponse;
use crate::api::error::{ApiError, ApiResult};

/// GET /
///
/// Connectivity check used when the data source is added to a dashboard.
pub async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse::new("hello"))
}

/// OPTIONS preflight; the CORS headers come from the router layers.
pub async fn preflight() {}

/// Decode a JSON body regardless of the declared content type.
///
/// An empty body decodes as `{}`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };

    serde_json::from_slice(raw).map_err(|e| ApiError::Decode(e.to_string()))
}
