//! Section rephrasing: rewrites one CV section for a target job in plain text.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    REPHRASE_GENERIC_SYSTEM, REPHRASE_PROMPT_TEMPLATE, REPHRASE_SECTION_SYSTEMS,
};
use crate::llm_client::{CompletionProvider, ResponseFormat};

#[derive(Debug, Clone, Deserialize)]
pub struct RephraseRequest {
    pub section_content: String,
    pub section_type: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RephraseResponse {
    pub original_content: String,
    pub rephrased_content: String,
    pub section_type: String,
}

fn system_prompt(section_type: &str) -> &'static str {
    REPHRASE_SECTION_SYSTEMS
        .iter()
        .find(|(kind, _)| *kind == section_type)
        .map(|(_, system)| *system)
        .unwrap_or(REPHRASE_GENERIC_SYSTEM)
}

/// `professional_summary` → `Professional Summary`.
fn section_title(section_type: &str) -> String {
    section_type
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub async fn rephrase_section(
    llm: &dyn CompletionProvider,
    request: RephraseRequest,
) -> Result<RephraseResponse, AppError> {
    if request.section_content.trim().is_empty() {
        return Err(AppError::Validation(
            "section_content cannot be empty".to_string(),
        ));
    }

    let prompt = REPHRASE_PROMPT_TEMPLATE
        .replace("{job_description}", &request.job_description)
        .replace("{section_title}", &section_title(&request.section_type))
        .replace("{section_content}", &request.section_content);

    let rephrased = llm
        .complete(
            &prompt,
            system_prompt(&request.section_type),
            ResponseFormat::Text,
        )
        .await?;

    info!(
        "Rephrased {} section: {} → {} chars",
        request.section_type,
        request.section_content.len(),
        rephrased.trim().len()
    );

    Ok(RephraseResponse {
        rephrased_content: rephrased.trim().to_string(),
        original_content: request.section_content,
        section_type: request.section_type,
    })
}
