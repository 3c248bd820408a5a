//! roster library - professional contact service
//!
//! Maintains a deduplicated table of professional contacts behind a
//! small HTTP surface. The interesting part is the bulk upsert pipeline
//! in [`upsert`]: batches of partial records are matched against the
//! existing table, validated, and created or merged record by record.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod upsert;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route(
            "/professionals/",
            get(api::list_professionals).post(api::create_professional),
        )
        .route("/professionals/bulk", post(api::bulk_upsert))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
