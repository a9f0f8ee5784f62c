//! Bulk operation API handlers
//!
//! POST /api/bulk/update and /api/bulk/delete return 202 Accepted with a
//! session id; the run itself executes in a background task and GET
//! /api/bulk/status/{session_id} polls its persisted progress.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{BulkOperation, BulkSession, BulkState, EntityKind};
use crate::services::bulk;
use crate::AppState;

/// POST /api/bulk/update request
#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub kind: EntityKind,
    /// Applied in this order
    pub ids: Vec<Uuid>,
    /// Patch fields matching the entity kind
    pub patch: serde_json::Value,
}

/// POST /api/bulk/delete request
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub kind: EntityKind,
    pub ids: Vec<Uuid>,
}

/// Response to both bulk start endpoints
#[derive(Debug, Serialize)]
pub struct BulkStartResponse {
    pub session_id: Uuid,
    pub state: BulkState,
    pub total: usize,
    pub started_at: DateTime<Utc>,
}

impl BulkStartResponse {
    fn from_session(session: &BulkSession) -> Self {
        Self {
            session_id: session.session_id,
            state: session.state,
            total: session.total,
            started_at: session.started_at,
        }
    }
}

/// POST /api/bulk/update
pub async fn start_update(
    State(state): State<AppState>,
    Json(request): Json<BulkUpdateRequest>,
) -> ApiResult<(StatusCode, Json<BulkStartResponse>)> {
    let patch =
        bulk::BulkPatch::from_json(request.kind, request.patch).map_err(ApiError::BadRequest)?;

    // Refusals still get a session so the caller can observe the outcome
    if let Some(reason) = bulk::update_rejection(&request.ids, &patch) {
        let session = BulkSession::rejected(BulkOperation::Update, request.kind, reason);
        db::bulk_sessions::save(&state.db, &session).await?;
        return Ok((
            StatusCode::ACCEPTED,
            Json(BulkStartResponse::from_session(&session)),
        ));
    }

    let session = BulkSession::new(BulkOperation::Update, request.kind, request.ids.len());
    db::bulk_sessions::save(&state.db, &session).await?;

    let response = BulkStartResponse::from_session(&session);

    tracing::info!(
        session_id = %session.session_id,
        table = %request.kind,
        total = request.ids.len(),
        "Bulk update started"
    );

    let pool = state.db.clone();
    let session_id = session.session_id;
    tokio::spawn(async move {
        if let Err(e) = bulk::run_update(pool, session, request.ids, patch).await {
            tracing::error!(
                session_id = %session_id,
                error = %e,
                "Bulk update background task failed"
            );
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// POST /api/bulk/delete
pub async fn start_delete(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> ApiResult<(StatusCode, Json<BulkStartResponse>)> {
    if let Some(reason) = bulk::delete_rejection(&request.ids) {
        let session = BulkSession::rejected(BulkOperation::Delete, request.kind, reason);
        db::bulk_sessions::save(&state.db, &session).await?;
        return Ok((
            StatusCode::ACCEPTED,
            Json(BulkStartResponse::from_session(&session)),
        ));
    }

    let session = BulkSession::new(BulkOperation::Delete, request.kind, request.ids.len());
    db::bulk_sessions::save(&state.db, &session).await?;

    let response = BulkStartResponse::from_session(&session);

    tracing::info!(
        session_id = %session.session_id,
        table = %request.kind,
        total = request.ids.len(),
        "Bulk delete started"
    );

    let pool = state.db.clone();
    let session_id = session.session_id;
    tokio::spawn(async move {
        if let Err(e) = bulk::run_delete(pool, session, request.ids).await {
            tracing::error!(
                session_id = %session_id,
                error = %e,
                "Bulk delete background task failed"
            );
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /api/bulk/status/{session_id}
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<BulkSession>> {
    let session = db::bulk_sessions::load(&state.db, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Bulk session not found: {}", session_id)))?;

    Ok(Json(session))
}

/// Build bulk operation routes
pub fn bulk_routes() -> Router<AppState> {
    Router::new()
        .route("/api/bulk/update", post(start_update))
        .route("/api/bulk/delete", post(start_delete))
        .route("/api/bulk/status/:session_id", get(get_status))
}
