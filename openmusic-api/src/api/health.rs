//! Health check endpoint
//!
//! Reports liveness plus the storage backend, so an operator can tell a
//! volatile instance from a persistent one.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use openmusic_common::config::StorageBackend;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// `memory` or `sqlite`
    pub storage: StorageBackend,
    /// False for the memory backend: everything is lost on restart
    pub persistent: bool,
    pub uptime_seconds: i64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        persistent: state.storage == StorageBackend::Sqlite,
        uptime_seconds: uptime.num_seconds().max(0),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
