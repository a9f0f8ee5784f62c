//! CSV export API handlers

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::models::EntityKind;
use crate::services::export;
use crate::AppState;

/// GET /api/export/{kind}
pub async fn export_table(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Response> {
    let kind: EntityKind = kind.parse().map_err(ApiError::BadRequest)?;

    let csv_text = export::export_csv(&state.db, kind).await?;
    let disposition = format!("attachment; filename=\"{}.csv\"", kind.table_name());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv_text,
    )
        .into_response())
}

/// Build export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/api/export/:kind", get(export_table))
}
