//! rrdserver HTTP API
//!
//! JSON data-source protocol for time-series dashboards, built with Axum.
//!
//! # Endpoints
//!
//! - `GET /` - Connectivity check (`{"message":"hello"}`)
//! - `POST /search` - Identifiers containing a substring
//! - `POST /query` - Samples for a list of identifiers over a time range
//! - `POST /annotations` - Event markers inside a time range
//! - `OPTIONS` on each of the above - CORS preflight
//! - `GET /health/live` - Liveness check
//! - `GET /health` - Full health status
//! - any other path - answered like `GET /`
//!
//! Every response carries `Content-Type: application/json; charset=utf-8`
//! and permissive CORS headers.
//!
//! # Example
//!
//! ```rust,ignore
//! use rrdserver::api::{serve, AppState};
//! use rrdserver::archive::RrdtoolStore;
//! use rrdserver::config::ServerConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let store = Arc::new(RrdtoolStore::new(&config.rrdtool_bin));
//!
//!     serve(AppState::new(&config, store), &config.addr()).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

/// Content type of every response
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const ALLOW_HEADERS: &str = "accept, content-type";
const ALLOW_METHODS: &str = "GET,POST,HEAD,OPTIONS";

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let data_routes = Router::new()
        .route("/", get(routes::hello).post(routes::hello))
        .route(
            "/search",
            axum::routing::post(routes::search::search).options(routes::preflight),
        )
        .route(
            "/query",
            axum::routing::post(routes::query::query).options(routes::preflight),
        )
        .route(
            "/annotations",
            axum::routing::post(routes::annotations::annotations).options(routes::preflight),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .merge(data_routes)
        .nest("/health", health_routes)
        .fallback(routes::hello)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, addr: &str) -> Result<(), ApiError> {
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("rrdserver listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("rrdserver shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
