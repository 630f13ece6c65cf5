//! Axum route handlers for the Results API.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::{export, parse_import, AnalysisRecord};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// GET /api/v1/results
pub async fn handle_list_results(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<AnalysisRecord>>, AppError> {
    let limit = params.limit.unwrap_or(state.config.results_history_limit);
    Ok(Json(state.store.recent(limit).await?))
}

/// DELETE /api/v1/results
pub async fn handle_clear_results(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/results/export?format=csv|json
pub async fn handle_export_results(
    State(state): State<AppState>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let limit = params.limit.unwrap_or(state.config.results_history_limit);
    let records = state.store.recent(limit).await?;
    let stamp = Utc::now().format("%Y-%m-%d");

    let (body, content_type, extension) = match params.format.as_deref() {
        Some("json") => (export::to_json(&records)?, "application/json", "json"),
        None | Some("csv") => (export::to_csv(&records)?, "text/csv; charset=utf-8", "csv"),
        Some(other) => {
            return Err(AppError::Validation(format!(
                "Unsupported export format '{other}' (use csv or json)"
            )))
        }
    };

    let disposition = format!("attachment; filename=\"resume-analysis-{stamp}.{extension}\"");
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/results/import
///
/// Replaces the history with a previously exported JSON array.
pub async fn handle_import_results(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ImportResponse>, AppError> {
    let records = parse_import(payload)?;
    let imported = records.len();
    state.store.replace_all(records).await?;
    Ok(Json(ImportResponse { imported }))
}
