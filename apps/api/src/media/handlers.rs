use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::intake::validation::sanitize_filename;
use crate::media::JD_IMAGE_INSTRUCTION;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image_base_64: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub transcription: String,
}

#[derive(Debug, Serialize)]
pub struct ImageAnalysisResponse {
    pub extracted_job_description: String,
}

/// POST /utility/transcribe-audio
///
/// Multipart form with an `audio_file` part.
pub async fn handle_transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptionResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        if field.name() != Some("audio_file") {
            continue;
        }
        let filename = sanitize_filename(field.file_name().unwrap_or("audio"));
        let audio = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read audio_file: {e}")))?;
        if audio.is_empty() {
            return Err(AppError::Validation("audio_file is empty".to_string()));
        }

        info!("Transcribing {filename} ({} bytes)", audio.len());
        let transcription = state.llm.transcribe(audio, &filename).await?;
        return Ok(Json(TranscriptionResponse { transcription }));
    }

    Err(AppError::Validation("audio_file is required".to_string()))
}

/// POST /utility/analyze-jd-image
///
/// Accepts raw base64 or a `data:<mime>;base64,` URL.
pub async fn handle_analyze_jd_image(
    State(state): State<AppState>,
    Json(request): Json<ImageRequest>,
) -> Result<Json<ImageAnalysisResponse>, AppError> {
    let (encoded, mime_type) = decode_image(&request.image_base_64)?;
    info!("Analyzing job description image ({mime_type})");

    let extracted_job_description = state
        .llm
        .describe_image(encoded, mime_type, JD_IMAGE_INSTRUCTION)
        .await?;
    Ok(Json(ImageAnalysisResponse {
        extracted_job_description,
    }))
}

/// Checks the payload decodes and sniffs its image type. Returns the base64 part and
/// the MIME type to send upstream.
fn decode_image(raw: &str) -> Result<(&str, &'static str), AppError> {
    let encoded = match raw.trim().split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw.trim(),
    };
    if encoded.is_empty() {
        return Err(AppError::Validation("image_base_64 is required".to_string()));
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| AppError::Validation(format!("image_base_64 is not valid base64: {e}")))?;

    let mime_type = match infer::get(&bytes).map(|t| t.mime_type()) {
        Some("image/jpeg") => "image/jpeg",
        Some("image/gif") => "image/gif",
        Some("image/webp") => "image/webp",
        _ => "image/png",
    };
    Ok((encoded, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_decode_image_accepts_raw_and_data_url() {
        let encoded = STANDARD.encode(PNG_HEADER);
        assert_eq!(decode_image(&encoded).unwrap(), (encoded.as_str(), "image/png"));

        let url = format!("data:image/png;base64,{encoded}");
        assert_eq!(decode_image(&url).unwrap().0, encoded);
    }

    #[test]
    fn test_decode_image_sniffs_jpeg() {
        let encoded = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        assert_eq!(decode_image(&encoded).unwrap().1, "image/jpeg");
    }

    #[test]
    fn test_invalid_base64_is_validation_error() {
        for raw in ["not base64 at all!", "", "   "] {
            let err = decode_image(raw).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{raw:?}");
        }
    }
}
