//! CSV import API handlers

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::error::ApiResult;
use crate::services::import;
use crate::AppState;

/// POST /api/import/transactions
///
/// Body is the raw CSV text (header row required). Returns per-file counts.
pub async fn import_transactions(
    State(state): State<AppState>,
    body: String,
) -> ApiResult<Json<import::ImportReport>> {
    let report = import::import_transactions_csv(&state.db, &body).await?;

    tracing::info!(
        imported = report.imported,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "Transaction import finished"
    );

    Ok(Json(report))
}

/// GET /api/import/template
///
/// Downloadable CSV documenting the expected column names.
pub async fn download_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"modelo_importacao.csv\"",
            ),
        ],
        import::template_csv(),
    )
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/import/transactions", post(import_transactions))
        .route("/api/import/template", get(download_template))
}
