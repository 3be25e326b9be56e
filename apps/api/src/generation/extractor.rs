//! Structured CV Generator: asks the generation model for a tailored CV as JSON.
//!
//! The reply is only parsed, never interpreted: the result is an `UntrustedCv` that the
//! transformation layer validates field by field. Provider failures are not retried here;
//! `LlmClient` already retries at the transport level.

use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::prompts::{
    EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM, NO_CONTEXT_PLACEHOLDER,
};
use crate::llm_client::prompts::DATE_FORMAT_RULES;
use crate::llm_client::{strip_json_fences, CompletionProvider, ResponseFormat};
use crate::retrieval::index::RetrievedContext;

/// Parsed but unvalidated model output.
#[derive(Debug, Clone, PartialEq)]
pub struct UntrustedCv(Value);

impl UntrustedCv {
    /// Parses a model reply, tolerating a surrounding Markdown code fence.
    pub fn parse(reply: &str) -> Result<Self, AppError> {
        serde_json::from_str(strip_json_fences(reply))
            .map(UntrustedCv)
            .map_err(|e| {
                AppError::GenerationFormat(format!("model did not return valid JSON: {e}"))
            })
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for UntrustedCv {
    fn from(value: Value) -> Self {
        UntrustedCv(value)
    }
}

/// Builds the extraction prompt from the job description, ranked passages and full CV.
pub fn build_extraction_prompt(
    cv_text: &str,
    job_description: &str,
    context: &RetrievedContext,
) -> String {
    let retrieved = if context.is_empty() {
        NO_CONTEXT_PLACEHOLDER.to_string()
    } else {
        context.joined()
    };

    EXTRACTION_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{retrieved_context}", &retrieved)
        .replace("{cv_text}", cv_text)
        .replace("{date_rules}", DATE_FORMAT_RULES)
}

pub async fn extract(
    llm: &dyn CompletionProvider,
    cv_text: &str,
    job_description: &str,
    context: &RetrievedContext,
) -> Result<UntrustedCv, AppError> {
    let prompt = build_extraction_prompt(cv_text, job_description, context);
    let reply = llm
        .complete(&prompt, EXTRACTION_SYSTEM, ResponseFormat::JsonObject)
        .await?;

    let raw = UntrustedCv::parse(&reply)?;
    info!(
        "Structured CV extracted ({} reply chars, {} context chunks)",
        reply.len(),
        context.len()
    );
    Ok(raw)
}
