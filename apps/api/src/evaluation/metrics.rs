//! Retrieval-quality metrics: pluggable, trait-based scorer.
//!
//! `NullRetrievalScorer` always reports zeros and is the default. `LlmRetrievalScorer`
//! asks the evaluation model to judge faithfulness, answer relevancy, context precision
//! and context recall. `AppState` holds an `Arc<dyn RetrievalScorer>` chosen at startup
//! via `ENABLE_RETRIEVAL_METRICS`, so callers never branch on availability.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;
use crate::evaluation::prompts::{
    METRICS_PROMPT_TEMPLATE, METRICS_SYSTEM, REFERENCE_ANSWER_TEMPLATE,
};
use crate::llm_client::{strip_json_fences, CompletionProvider, ResponseFormat};
use crate::models::evaluation::RetrievalMetrics;

#[async_trait]
pub trait RetrievalScorer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn score(
        &self,
        question: &str,
        contexts: &[String],
        answer: &str,
        ground_truth: &str,
    ) -> Result<RetrievalMetrics, AppError>;
}

/// Synthesized ground truth for a job description.
pub fn reference_answer(job_description: &str) -> String {
    REFERENCE_ANSWER_TEMPLATE.replace("{job_description}", job_description)
}

// ────────────────────────────────────────────────────────────────────────────
// NullRetrievalScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct NullRetrievalScorer;

#[async_trait]
impl RetrievalScorer for NullRetrievalScorer {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn score(
        &self,
        _question: &str,
        _contexts: &[String],
        _answer: &str,
        _ground_truth: &str,
    ) -> Result<RetrievalMetrics, AppError> {
        Ok(RetrievalMetrics::zero())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRetrievalScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmRetrievalScorer {
    llm: Arc<dyn CompletionProvider>,
}

impl LlmRetrievalScorer {
    pub fn new(llm: Arc<dyn CompletionProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RetrievalScorer for LlmRetrievalScorer {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn score(
        &self,
        question: &str,
        contexts: &[String],
        answer: &str,
        ground_truth: &str,
    ) -> Result<RetrievalMetrics, AppError> {
        let numbered = contexts
            .iter()
            .enumerate()
            .map(|(i, c)| format!("[{}] {}", i + 1, c))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = METRICS_PROMPT_TEMPLATE
            .replace("{question}", question)
            .replace("{contexts}", &numbered)
            .replace("{answer}", answer)
            .replace("{ground_truth}", ground_truth);

        let reply = self
            .llm
            .complete(&prompt, METRICS_SYSTEM, ResponseFormat::JsonObject)
            .await?;
        let value: Value = serde_json::from_str(strip_json_fences(&reply)).map_err(|e| {
            AppError::GenerationFormat(format!("metrics judge returned invalid JSON: {e}"))
        })?;

        Ok(metrics_from_value(&value))
    }
}

/// Reads the four metrics; anything that is not a number becomes NaN and is zeroed by
/// `sanitized`.
fn metrics_from_value(value: &Value) -> RetrievalMetrics {
    let metric = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(f64::NAN);
    RetrievalMetrics {
        faithfulness: metric("faithfulness"),
        answer_relevancy: metric("answer_relevancy"),
        context_precision: metric("context_precision"),
        context_recall: metric("context_recall"),
    }
    .sanitized()
}
