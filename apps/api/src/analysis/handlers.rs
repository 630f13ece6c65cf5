//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::{run_analysis, AnalysisRequest};
use crate::errors::AppError;
use crate::extraction::ExtractionError;
use crate::state::AppState;
use crate::storage::AnalysisRecord;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub job_description: String,
    pub resume_text: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkAnalyzeResponse {
    pub results: Vec<BulkItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatus {
    Completed,
    Error,
}

#[derive(Debug, Serialize)]
pub struct BulkItem {
    pub filename: String,
    pub status: BulkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BulkItemError>,
}

#[derive(Debug, Serialize)]
pub struct BulkItemError {
    pub code: &'static str,
    pub message: String,
}

struct Upload {
    filename: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart `file` (PDF) and `jd` (job description text).
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisRecord>, AppError> {
    let (jd, mut uploads) = read_form(multipart).await?;
    let jd = require_jd(jd)?;
    let upload = match uploads.len() {
        0 => return Err(AppError::Validation("No file provided".to_string())),
        1 => uploads.remove(0),
        n => {
            return Err(AppError::Validation(format!(
                "Expected one file, got {n}; use /api/v1/analyze/bulk"
            )))
        }
    };

    let record = analyze_upload(&state, &jd, upload).await?;
    Ok(Json(record))
}

/// POST /api/v1/analyze/text
///
/// Same pipeline as `/analyze` for callers that already have plain text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let jd = require_jd(Some(req.job_description))?;
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }

    let filename = req
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| "resume.txt".to_string());
    let request = AnalysisRequest::new(jd, req.resume_text, filename);
    let assessment = run_analysis(&request, state.provider.as_ref()).await?;

    let record = AnalysisRecord::new(assessment, None);
    persist(&state, &record).await;
    Ok(Json(record))
}

/// POST /api/v1/analyze/bulk
///
/// Multipart `jd` plus any number of `files`. Files are analyzed one at a
/// time so only one upstream call is in flight; a failed file is reported
/// in its slot and the batch continues.
pub async fn handle_analyze_bulk(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BulkAnalyzeResponse>, AppError> {
    let (jd, uploads) = read_form(multipart).await?;
    let jd = require_jd(jd)?;
    if uploads.is_empty() {
        return Err(AppError::Validation(
            "Please add at least one resume".to_string(),
        ));
    }

    let total = uploads.len();
    let mut results = Vec::with_capacity(total);

    for (i, upload) in uploads.into_iter().enumerate() {
        let filename = upload.filename.clone();
        info!("Bulk analysis {}/{}: {}", i + 1, total, filename);

        let item = match analyze_upload(&state, &jd, upload).await {
            Ok(record) => BulkItem {
                filename,
                status: BulkStatus::Completed,
                result: Some(record),
                error: None,
            },
            Err(e) => {
                let (_, code, message) = e.describe();
                warn!("Bulk analysis of {filename} failed: {message}");
                BulkItem {
                    filename,
                    status: BulkStatus::Error,
                    result: None,
                    error: Some(BulkItemError { code, message }),
                }
            }
        };
        results.push(item);
    }

    Ok(Json(BulkAnalyzeResponse { results }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Collects the `jd` text field and every file field (`file` or `files`).
async fn read_form(mut multipart: Multipart) -> Result<(Option<String>, Vec<Upload>), AppError> {
    let mut jd = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("jd") => jd = Some(field.text().await?),
            Some("file") | Some("files") => {
                let filename = field
                    .file_name()
                    .map(String::from)
                    .unwrap_or_else(|| "resume.pdf".to_string());
                let bytes = field.bytes().await?;
                uploads.push(Upload { filename, bytes });
            }
            _ => {}
        }
    }

    Ok((jd, uploads))
}

fn require_jd(jd: Option<String>) -> Result<String, AppError> {
    jd.filter(|j| !j.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Please enter a job description".to_string()))
}

/// Extract → analyze → archive → persist for one uploaded PDF.
async fn analyze_upload(
    state: &AppState,
    jd: &str,
    upload: Upload,
) -> Result<AnalysisRecord, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation(format!(
            "File '{}' is empty",
            upload.filename
        )));
    }
    let resume_text = extract_text(state, upload.bytes.clone()).await?;

    let request = AnalysisRequest::new(jd, resume_text, upload.filename.as_str());
    let assessment = run_analysis(&request, state.provider.as_ref()).await?;

    let archive_key = match &state.archive {
        Some(archive) => match archive.store_resume(&upload.filename, upload.bytes).await {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("Failed to archive {}: {e}", upload.filename);
                None
            }
        },
        None => None,
    };

    let record = AnalysisRecord::new(assessment, archive_key);
    persist(state, &record).await;
    Ok(record)
}

async fn extract_text(state: &AppState, bytes: Bytes) -> Result<String, AppError> {
    let extractor = state.extractor.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::Extraction(ExtractionError::Unreadable(
                    "extractor panicked on this file".to_string(),
                ))
            } else {
                AppError::Internal(anyhow::anyhow!("extraction task failed: {e}"))
            }
        })?
        .map_err(AppError::from)
}

/// Storage failures never fail the analysis.
async fn persist(state: &AppState, record: &AnalysisRecord) {
    if let Err(e) = state.store.save(record).await {
        warn!("Failed to save result for {}: {e}", record.assessment.filename);
    }
}
