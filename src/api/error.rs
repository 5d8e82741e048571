//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::annotations::AnnotationError;
use crate::query::QueryError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not valid JSON for the endpoint
    #[error("Cannot decode the request: {0}")]
    Decode(String),

    /// Request decoded but carries invalid values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query pipeline error
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Annotation store error
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Decode(_) => (StatusCode::BAD_REQUEST, "DECODE_ERROR"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Query(QueryError::MalformedIdentifier(_)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_IDENTIFIER")
            }
            ApiError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR"),
            ApiError::Annotation(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ANNOTATION_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
