//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::error::ApiResult;
use crate::AppState;

/// GET /health
///
/// Liveness plus a database round-trip.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    sqlx::query("SELECT 1").execute(&state.db).await.map_err(vendio_common::Error::Database)?;

    Ok(Json(json!({
        "status": "ok",
        "service": "vendio-dq",
        "database": "reachable",
    })))
}

/// Build health routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
