//! Plain-text extraction from uploaded CV documents.
//!
//! PDF goes through `pdf-extract`. DOCX is a zip archive; its body lives in
//! `word/document.xml`, read here as one output line per `<w:p>` paragraph. Both are
//! CPU-bound and run on the blocking pool.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;
use tracing::info;

use crate::errors::AppError;
use crate::intake::validation::DocumentKind;

pub async fn extract_text(bytes: Bytes, kind: DocumentKind) -> Result<String, AppError> {
    let size = bytes.len();
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => pdf_text(&bytes),
        DocumentKind::Docx => docx_text(&bytes),
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            // pdf-extract panics on some malformed documents
            AppError::UnsupportedFileType("document could not be parsed".to_string())
        } else {
            AppError::Internal(anyhow::anyhow!("text extraction task failed: {e}"))
        }
    })??;

    info!(
        "Extracted {} chars from {:?} upload ({size} bytes)",
        text.chars().count(),
        kind
    );
    Ok(text)
}

fn pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnsupportedFileType(format!("could not read PDF: {e}")))
}

fn docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let unreadable = |e: &dyn std::fmt::Display| {
        AppError::UnsupportedFileType(format!("could not read DOCX: {e}"))
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| unreadable(&e))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| unreadable(&e))?
        .read_to_string(&mut xml)
        .map_err(|e| unreadable(&e))?;

    Ok(document_xml_text(&xml))
}

fn run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\b[^>]*/>|<w:br\b[^>]*/>")
            .expect("valid docx run regex")
    })
}

/// Text of every paragraph in a WordprocessingML body, joined by newlines.
fn document_xml_text(xml: &str) -> String {
    let mut segments: Vec<&str> = xml.split("</w:p>").collect();
    if segments.len() > 1 {
        // Whatever follows the last paragraph (section properties) carries no text.
        segments.pop();
    }

    segments
        .into_iter()
        .map(|segment| {
            run_pattern()
                .captures_iter(segment)
                .map(|caps| match caps.get(1) {
                    Some(text) => decode_entities(text.as_str()),
                    None if caps[0].starts_with("<w:tab") => "\t".to_string(),
                    None => "\n".to_string(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&(lt|gt|quot|apos|amp|#[0-9]+|#[xX][0-9A-Fa-f]+);")
            .expect("valid xml entity regex")
    })
}

/// Single pass, so an escaped `&amp;#233;` stays `&#233;`. References to invalid
/// code points are left as written.
fn decode_entities(text: &str) -> String {
    entity_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let reference = &name[1..];
                    let code = match reference.strip_prefix(&['x', 'X'][..]) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => reference.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
