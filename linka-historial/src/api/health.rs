//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Liveness plus the configured sources
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub warehouse_tables: Vec<String>,
    pub profile_collection: Option<String>,
    pub query_timeout_ms: u64,
}

/// GET /health
///
/// Reports configuration only; neither store is contacted.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (warehouse_tables, profile_collection) = state.history.sources();
    Json(HealthResponse {
        status: "ok",
        module: "linka-historial",
        version: env!("CARGO_PKG_VERSION"),
        warehouse_tables,
        profile_collection,
        query_timeout_ms: state.history.settings().query_timeout_ms,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
