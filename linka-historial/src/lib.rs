//! linka-historial library - general activity log service
//!
//! Serves the chronological historial of campaign creations, audience
//! creations and message sends, enriched with user display names.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod historial;
pub mod pagination;
pub mod store;

use historial::HistoryService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<HistoryService>,
}

impl AppState {
    /// Create new application state
    pub fn new(history: HistoryService) -> Self {
        Self {
            history: Arc::new(history),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::http::Method;
    use axum::routing::get;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ]);

    Router::new()
        .route("/historial/general", get(api::get_historial_general))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
