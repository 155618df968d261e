//! anidex-api library - species catalog ingestion service
//!
//! Pipeline, leaf-first:
//! - [`schema`]: declared form fields
//! - [`mapper`]: raw form values onto [`record::SubmissionRecord`]
//! - [`media_store`]: all-or-nothing photo storage
//! - [`ingest`]: one submission from upload to insert
//! - [`response`]: uniform response envelope

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod ingest;
pub mod mapper;
pub mod media_store;
pub mod record;
pub mod response;
pub mod schema;

use ingest::Ingestor;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
    /// Token signing salt; `None` disables authentication
    pub salt: Option<Arc<str>>,
    /// Largest accepted submission body in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(ingestor: Ingestor, salt: Option<String>, max_body_bytes: usize) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            salt: salt.map(Arc::from),
            max_body_bytes,
        }
    }
}

/// Build application router
///
/// Submission routes require auth; health routes do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::post;

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/animal", post(api::create_animal))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new().merge(api::health_routes());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION]);

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
