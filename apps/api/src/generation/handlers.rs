//! Axum route handlers for the CV API.

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::rephrase::{rephrase_section, RephraseRequest, RephraseResponse};
use crate::generation::transform::to_dict;
use crate::intake::extract::extract_text;
use crate::intake::validation::validate_upload;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub job_description: String,
    pub user_cv_text: String,
}

/// Query string of `/cv/tailor-from-file`.
#[derive(Debug, Default, Deserialize)]
pub struct TailorFromFileQuery {
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractCvRequest {
    pub cv_text: String,
    pub job_description: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /cv/tailor
///
/// Full pipeline: retrieve → generate → transform → evaluate.
/// Returns the StructuredCv dictionary with an `analysis` key.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<Value>, AppError> {
    let tailored = state
        .pipeline
        .tailor(&request.user_cv_text, &request.job_description)
        .await?;
    Ok(Json(Value::Object(tailored)))
}

/// POST /cv/tailor-from-file
///
/// Multipart form with a `cv_file` (PDF or DOCX). The job description comes from the
/// `job_description` query parameter, or from a multipart text field of the same name.
pub async fn handle_tailor_from_file(
    State(state): State<AppState>,
    Query(query): Query<TailorFromFileQuery>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut job_description = query.job_description.filter(|jd| !jd.trim().is_empty());
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "job_description" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read job_description: {e}"))
                })?;
                if job_description.is_none() {
                    job_description = Some(text);
                }
            }
            "cv_file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read cv_file: {e}")))?;
                file = Some((filename, bytes));
            }
            _ => {}
        }
    }

    let job_description = job_description
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;
    let (filename, bytes) =
        file.ok_or_else(|| AppError::Validation("cv_file is required".to_string()))?;

    let upload = validate_upload(&bytes, &filename, state.config.max_upload_bytes)?;
    let cv_text = extract_text(bytes, upload.kind).await?;
    info!("Tailoring from file {}", upload.filename);

    let tailored = state.pipeline.tailor(&cv_text, &job_description).await?;
    Ok(Json(Value::Object(tailored)))
}

/// POST /cv/extract-cv-data
///
/// Same as tailoring without the evaluation step.
pub async fn handle_extract_cv_data(
    State(state): State<AppState>,
    Json(request): Json<ExtractCvRequest>,
) -> Result<Json<Value>, AppError> {
    let extracted = state
        .pipeline
        .extract_cv(&request.cv_text, &request.job_description)
        .await?;
    Ok(Json(Value::Object(to_dict(&extracted.cv)?)))
}

/// POST /cv/rephrase-section
pub async fn handle_rephrase_section(
    State(state): State<AppState>,
    Json(request): Json<RephraseRequest>,
) -> Result<Json<RephraseResponse>, AppError> {
    let response = rephrase_section(state.generator.as_ref(), request).await?;
    Ok(Json(response))
}
