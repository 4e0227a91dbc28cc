//! openmusic-api library interface
//!
//! Exposes the router, services and stores for the binary and for
//! integration tests.

pub mod access;
pub mod api;
pub mod cli;
pub mod models;
pub mod services;
pub mod store;

pub use crate::api::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use openmusic_common::config::StorageBackend;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::Services;
use crate::store::Stores;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Backend the stores run on, reported by the health check
    pub storage: StorageBackend,
    /// Secret shared with the gateway that signs caller identities
    pub auth_secret: Arc<str>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(stores: Stores, auth_secret: &str) -> Self {
        Self {
            storage: stores.backend,
            services: Services::new(stores),
            auth_secret: Arc::from(auth_secret),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::user_routes())
        .merge(api::album_routes())
        .merge(api::song_routes())
        .merge(api::playlist_routes())
        .merge(api::collaboration_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
