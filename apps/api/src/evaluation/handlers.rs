use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::intake::validation::validate_job_description;
use crate::models::evaluation::CommitteeEvaluation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluationRequest {
    pub job_description: String,
    pub cv_json: Map<String, Value>,
}

/// POST /evaluation/cv
///
/// Committee-only evaluation of an already structured CV.
pub async fn handle_evaluate_cv(
    State(state): State<AppState>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<CommitteeEvaluation>, AppError> {
    let job_description = validate_job_description(&request.job_description)?;
    let cv_content = serde_json::to_string_pretty(&request.cv_json).map_err(anyhow::Error::from)?;

    let evaluation = state
        .evaluator
        .committee()
        .evaluate(&job_description, &cv_content)
        .await;
    Ok(Json(evaluation))
}
