use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::errors::AppError;

pub const MAX_JOB_DESCRIPTION_CHARS: usize = 50_000;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 10;
pub const MAX_CV_TEXT_CHARS: usize = 100_000;
pub const MIN_CV_TEXT_CHARS: usize = 50;
const MAX_FILENAME_CHARS: usize = 255;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Upload formats the text extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub kind: DocumentKind,
    pub filename: String,
}

fn markup_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid script regex"),
            Regex::new(r"(?i)javascript:").expect("valid scheme regex"),
            Regex::new(r"(?i)\bon\w+\s*=").expect("valid handler regex"),
        ]
    })
}

/// Truncates to `max_chars`, strips script blocks, `javascript:` and inline `on*=`
/// handlers, then trims.
pub fn sanitize_user_input(text: &str, max_chars: usize) -> String {
    let mut sanitized: String = text.chars().take(max_chars).collect();
    for pattern in markup_patterns() {
        sanitized = pattern.replace_all(&sanitized, "").into_owned();
    }
    sanitized.trim().to_string()
}

fn validate_text(
    text: &str,
    label: &str,
    max_chars: usize,
    min_chars: usize,
) -> Result<String, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(format!("{label} is required")));
    }
    let sanitized = sanitize_user_input(text, max_chars);
    if sanitized.chars().count() < min_chars {
        return Err(AppError::Validation(format!(
            "{label} must be at least {min_chars} characters long"
        )));
    }
    Ok(sanitized)
}

pub fn validate_job_description(text: &str) -> Result<String, AppError> {
    validate_text(
        text,
        "Job description",
        MAX_JOB_DESCRIPTION_CHARS,
        MIN_JOB_DESCRIPTION_CHARS,
    )
}

pub fn validate_cv_text(text: &str) -> Result<String, AppError> {
    validate_text(text, "CV text", MAX_CV_TEXT_CHARS, MIN_CV_TEXT_CHARS)
}

/// Checks size first, then sniffs the content. The declared filename never decides the
/// format.
pub fn validate_upload(
    bytes: &[u8],
    filename: &str,
    max_bytes: usize,
) -> Result<ValidatedUpload, AppError> {
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(max_bytes));
    }

    let detected = infer::get(bytes).map(|t| t.mime_type());
    let kind = match detected {
        Some(PDF_MIME) => DocumentKind::Pdf,
        Some(DOCX_MIME) => DocumentKind::Docx,
        Some(other) => {
            return Err(AppError::UnsupportedFileType(format!(
                "{other}; allowed types: PDF, DOCX"
            )))
        }
        None => {
            return Err(AppError::UnsupportedFileType(
                "unrecognized content; allowed types: PDF, DOCX".to_string(),
            ))
        }
    };

    let upload = ValidatedUpload {
        kind,
        filename: sanitize_filename(filename),
    };
    info!(
        "Upload accepted: {} ({}, {} bytes)",
        upload.filename,
        kind.mime_type(),
        bytes.len()
    );
    Ok(upload)
}

/// Basename only, characters outside `[A-Za-z0-9_.-]` replaced with `_`, at most 255
/// chars with the extension kept.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return "upload".to_string();
    }
    if cleaned.len() <= MAX_FILENAME_CHARS {
        return cleaned;
    }

    // ASCII only from here on, so byte and char offsets agree.
    match cleaned.rfind('.') {
        Some(dot) if cleaned.len() - dot < MAX_FILENAME_CHARS => {
            let ext = &cleaned[dot..];
            format!("{}{}", &cleaned[..MAX_FILENAME_CHARS - ext.len()], ext)
        }
        _ => cleaned[..MAX_FILENAME_CHARS].to_string(),
    }
}
