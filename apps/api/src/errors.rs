use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Payload too large: maximum size is {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or unusable provider credentials. Fatal for the affected component.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The upstream model call itself failed (transport, rate limit, provider error).
    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// The model answered, but not with parseable structured output.
    #[error("Generation format error: {0}")]
    GenerationFormat(String),

    /// Parseable model output whose shape cannot be turned into a CV.
    #[error("Transformation error: {0}")]
    Transformation(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredentials => AppError::Configuration(e.to_string()),
            other => AppError::AiProvider(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFileType(msg) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FILE_TYPE",
                format!("Unsupported file type: {msg}"),
            ),
            AppError::PayloadTooLarge(max) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("File too large. Maximum size: {max} bytes"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AiProvider(msg) => {
                tracing::error!("AI provider error: {msg}");
                (StatusCode::BAD_GATEWAY, "AI_PROVIDER_ERROR", msg.clone())
            }
            AppError::GenerationFormat(msg) => {
                tracing::error!("Generation format error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_FORMAT_ERROR",
                    msg.clone(),
                )
            }
            AppError::Transformation(msg) => {
                tracing::error!("Transformation error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "TRANSFORMATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    msg.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_variant() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::UnsupportedFileType("text/plain".into()),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::PayloadTooLarge(10), StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::NotFound("t".into()), StatusCode::NOT_FOUND),
            (AppError::AiProvider("down".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::GenerationFormat("bad json".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Transformation("experience".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_missing_credentials_maps_to_configuration() {
        let err: AppError = LlmError::MissingCredentials.into();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_empty_content_maps_to_ai_provider() {
        let err: AppError = LlmError::EmptyContent.into();
        assert!(matches!(err, AppError::AiProvider(_)));
    }
}
