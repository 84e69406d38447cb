//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The upload route (`POST /api/upload`) and health check
//! - The JSON error responder
//! - Shared application state

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use linkdrop_core::ingest::MultipartIngester;
use linkdrop_core::pipeline::UploadPipeline;
use linkdrop_dropbox::DropboxClient;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload pipeline over the Dropbox transport.
    pub pipeline: Arc<UploadPipeline<DropboxClient>>,
    /// Request body validator.
    pub ingester: Arc<MultipartIngester>,
}

impl AppState {
    /// Create state from its parts.
    #[must_use]
    pub fn new(pipeline: UploadPipeline<DropboxClient>, ingester: MultipartIngester) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            ingester: Arc::new(ingester),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.ingester.limits().request_body_limit();

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
