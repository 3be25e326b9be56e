use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::cv::StructuredCv;
use crate::render::download_filename;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfRequest {
    pub template_id: String,
    pub data: StructuredCv,
}

#[derive(Debug, Serialize)]
pub struct TemplateList {
    pub templates: Vec<String>,
}

/// GET /pdf/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<TemplateList>, AppError> {
    let templates = state.renderer.templates().list().await?;
    Ok(Json(TemplateList { templates }))
}

/// POST /pdf/generate
///
/// Responds with the PDF as an attachment named after the candidate.
pub async fn handle_generate_pdf(
    State(state): State<AppState>,
    Json(request): Json<PdfRequest>,
) -> Result<Response, AppError> {
    let pdf = state
        .renderer
        .render_pdf(&request.template_id, &request.data)
        .await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_filename(&request.data.personal.name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
