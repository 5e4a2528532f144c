//! HTTP handlers: thin shims between multipart/JSON extraction and the
//! pipeline/gateway. All business rules live below this layer.

use crate::error::ScanError;
use crate::output::{AnalysisOutcome, AnalysisTypeInfo, BatchOutcome, ProcessingOutcome};
use crate::pipeline::document::Upload;
use crate::server::response::ApiResponse;
use crate::server::AppState;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /api/health
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, ScanError> {
    let ocr = state.pipeline.recognizer().service_info();
    let data = json!({
        "status": "healthy",
        "services": {
            "ocr": ocr,
            "file_store": "ready",
            "preview_builder": "ready",
        }
    });
    Ok(Json(ApiResponse::success(data, "service healthy")))
}

/// POST /api/upload — single-file multipart upload, field name `file`.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ProcessingOutcome>>, ScanError> {
    let mut uploads = read_uploads(multipart, "file").await?;
    let upload = uploads
        .pop()
        .ok_or_else(|| ScanError::Validation("no file selected".into()))?;

    let outcome = state.pipeline.process(&upload).await?;
    Ok(Json(ApiResponse::success(
        outcome,
        "document recognition complete",
    )))
}

/// POST /api/batch-upload — multi-file multipart upload, field name `files`.
pub async fn batch_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<BatchOutcome>>, ScanError> {
    let uploads = read_uploads(multipart, "files").await?;
    if uploads.is_empty() {
        return Err(ScanError::Validation("file list is empty".into()));
    }

    let outcome = state.pipeline.process_batch(&uploads).await?;
    let message = format!(
        "batch processing complete: {}/{} succeeded",
        outcome.summary.success, outcome.summary.total
    );
    Ok(Json(ApiResponse::success(outcome, message)))
}

/// GET /api/analysis-types
pub async fn analysis_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AnalysisTypeInfo>>>, ScanError> {
    Ok(Json(ApiResponse::success(
        state.gateway.analysis_types(),
        "configured analysis types",
    )))
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

fn default_analysis_type() -> String {
    "general".to_string()
}

/// POST /api/ai-analysis
pub async fn ai_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, ScanError> {
    let outcome = state
        .gateway
        .analyze(request.content.trim(), &request.analysis_type)
        .await?;
    Ok(Json(ApiResponse::success(outcome, "analysis complete")))
}

/// Collect every part named `field_name` into `Upload`s.
async fn read_uploads(mut multipart: Multipart, field_name: &str) -> Result<Vec<Upload>, ScanError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::Validation(format!("malformed multipart request: {}", e)))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ScanError::Validation(format!("failed to read upload body: {}", e)))?;
        uploads.push(Upload {
            original_name,
            bytes: bytes.to_vec(),
        });
    }

    Ok(uploads)
}
