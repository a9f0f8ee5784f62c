//! Validation API handlers
//!
//! POST /api/validate/{kind} runs a full-table pass; GET
//! /api/validate/{kind}/{id} scores a single record.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{EntityKind, ValidationResult};
use crate::services::validation_run;
use crate::AppState;

fn parse_kind(raw: &str) -> Result<EntityKind, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

/// POST /api/validate/{kind}
///
/// Runs the full pipeline: fetch, validate, persist scores, aggregate, audit
/// log. Returns the summary plus per-record findings.
pub async fn run_validation(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<validation_run::RunReport>> {
    let kind = parse_kind(&kind)?;

    let report = validation_run::run(&state.db, kind).await?;

    tracing::info!(
        table = %kind,
        total = report.summary.total,
        invalid = report.summary.invalid_count,
        average_score = report.summary.average_score,
        "Validation run complete"
    );

    Ok(Json(report))
}

/// GET /api/validate/{kind}/{id}
///
/// A record that cannot be loaded yields the degenerate zero-score result,
/// not a 404.
pub async fn validate_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<ValidationResult>> {
    let kind = parse_kind(&kind)?;

    let result = validation_run::validate_record(&state.db, kind, id).await?;
    Ok(Json(result))
}

/// Build validation routes
pub fn validation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/validate/:kind", post(run_validation))
        .route("/api/validate/:kind/:id", get(validate_record))
}
