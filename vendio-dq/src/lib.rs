//! vendio-dq library - Data Quality module
//!
//! Validates CRM records (customers, transactions, deals), scores their
//! completeness, runs bulk updates/deletes with progress tracking, and
//! imports/exports transaction data as CSV.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod validators;

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
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::validation::validation_routes())
        .merge(api::bulk::bulk_routes())
        .merge(api::import::import_routes())
        .merge(api::export::export_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
