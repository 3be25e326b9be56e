//! CV tailoring pipeline.
//!
//! Flow: validate → index + retrieve (under the index lock) → extract → transform →
//! evaluate (both tracks concurrently) → attach `analysis`.
//!
//! The index lock is released as soon as the context is retrieved; generation and
//! evaluation work on the owned `RetrievedContext`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::orchestrator::Evaluator;
use crate::generation::extractor::extract;
use crate::generation::transform::{to_cv, to_dict};
use crate::intake::validation::{validate_cv_text, validate_job_description};
use crate::llm_client::CompletionProvider;
use crate::models::cv::StructuredCv;
use crate::retrieval::index::RetrievedContext;
use crate::retrieval::IndexSession;

pub struct TailorPipeline {
    generator: Arc<dyn CompletionProvider>,
    index: Arc<IndexSession>,
    evaluator: Arc<Evaluator>,
}

/// A transformed CV together with the context it was generated from.
pub struct ExtractedCv {
    pub cv: StructuredCv,
    pub context: RetrievedContext,
}

impl TailorPipeline {
    pub fn new(
        generator: Arc<dyn CompletionProvider>,
        index: Arc<IndexSession>,
        evaluator: Arc<Evaluator>,
    ) -> Self {
        Self {
            generator,
            index,
            evaluator,
        }
    }

    /// Retrieval, generation and transformation without evaluation.
    pub async fn extract_cv(
        &self,
        cv_text: &str,
        job_description: &str,
    ) -> Result<ExtractedCv, AppError> {
        let job_description = validate_job_description(job_description)?;
        let cv_text = validate_cv_text(cv_text)?;
        self.extract_validated(&cv_text, &job_description).await
    }

    /// Full tailoring: the StructuredCv dictionary with an `analysis` key.
    pub async fn tailor(
        &self,
        cv_text: &str,
        job_description: &str,
    ) -> Result<Map<String, Value>, AppError> {
        let job_description = validate_job_description(job_description)?;
        let cv_text = validate_cv_text(cv_text)?;
        let ExtractedCv { cv, context } = self.extract_validated(&cv_text, &job_description).await?;

        let mut structured = to_dict(&cv)?;
        let cv_content = serde_json::to_string(&structured).map_err(anyhow::Error::from)?;

        let analysis = self
            .evaluator
            .evaluate(&job_description, &cv_content, &context)
            .await;
        info!(
            "CV tailoring complete: average_score={}",
            analysis.committee_evaluation.average_score
        );

        structured.insert(
            "analysis".to_string(),
            serde_json::to_value(&analysis).map_err(anyhow::Error::from)?,
        );
        Ok(structured)
    }

    async fn extract_validated(
        &self,
        cv_text: &str,
        job_description: &str,
    ) -> Result<ExtractedCv, AppError> {
        info!(
            "CV extraction: cv_text={} chars, job_description={} chars",
            cv_text.len(),
            job_description.len()
        );

        let context = self
            .index
            .index_and_retrieve(cv_text, job_description)
            .await?;

        let raw = extract(self.generator.as_ref(), cv_text, job_description, &context).await?;
        let cv = to_cv(&raw)?;
        Ok(ExtractedCv { cv, context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::committee::Committee;
    use crate::evaluation::metrics::NullRetrievalScorer;
    use crate::llm_client::stubs::{HashEmbedder, ScriptedCompletion};
    use crate::retrieval::splitter::TextSplitter;

    const CV_JSON: &str = r#"{
        "personal": {"name": "Ada Lovelace", "email": "ada@example.com"},
        "professional_summary": "Systems engineer focused on Rust services.",
        "experience": [{
            "company": "Analytical Engines Ltd",
            "role": "Senior Engineer",
            "startDate": "Jan 2021",
            "endDate": "Present",
            "achievements": ["Cut p99 latency by 40%"]
        }],
        "education": [{"institution": "University of London", "startDate": "2012", "endDate": "not a date"}],
        "projects": [],
        "skills": {"technical": ["Rust", "tokio"], "soft": [], "languages": ["English"]},
        "licenses_certifications": []
    }"#;

    fn words(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|i| format!("{prefix}{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pipeline(llm: ScriptedCompletion) -> TailorPipeline {
        let llm: Arc<dyn CompletionProvider> = Arc::new(llm);
        let index = Arc::new(IndexSession::new(
            Arc::new(HashEmbedder::default()),
            TextSplitter::default(),
            7,
        ));
        let committee = Committee::new(
            llm.clone(),
            vec![
                "Strict Hiring Manager".to_string(),
                "Creative Recruiter".to_string(),
                "Senior Technical Lead".to_string(),
            ],
        );
        let evaluator = Arc::new(Evaluator::new(Arc::new(NullRetrievalScorer), committee));
        TailorPipeline::new(llm, index, evaluator)
    }

    fn scripted() -> ScriptedCompletion {
        ScriptedCompletion::new()
            .reply("act as: Strict Hiring Manager", r#"{"persona": "Strict Hiring Manager", "score": 8, "justification": "Strong match."}"#)
            .reply("act as: Creative Recruiter", r#"{"persona": "Creative Recruiter", "score": 6, "justification": "Dry summary."}"#)
            .reply("act as: Senior Technical Lead", r#"{"persona": "Senior Technical Lead", "score": 7, "justification": "Good depth."}"#)
            .reply("Full CV Text", CV_JSON)
    }

    #[tokio::test]
    async fn test_end_to_end_tailoring_with_stub_providers() {
        let cv_text = format!("Ada Lovelace Rust engineer {}", words("experience", 196));
        let job_description = words("requirement", 50);

        let result = pipeline(scripted())
            .tailor(&cv_text, &job_description)
            .await
            .unwrap();

        assert_eq!(result["personal"]["name"], "Ada Lovelace");
        assert_eq!(result["experience"][0]["startDateValue"]["month"], 1);
        assert_eq!(result["experience"][0]["endDateValue"]["isPresent"], true);
        assert!(result["education"][0]["endDateValue"].is_null());
        assert_eq!(result["education"][0]["endDate"], "not a date");

        let analysis = &result["analysis"];
        assert_eq!(analysis["committee_evaluation"]["average_score"], 7.0);
        assert_eq!(
            analysis["committee_evaluation"]["individual_evaluations"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
        for metric in ["faithfulness", "answer_relevancy", "context_precision", "context_recall"] {
            assert_eq!(analysis["ragas_scores"][metric], 0.0);
        }
    }

    #[tokio::test]
    async fn test_extract_cv_has_no_analysis() {
        let cv_text = words("skill", 60);
        let extracted = pipeline(scripted())
            .extract_cv(&cv_text, "Senior Rust engineer wanted")
            .await
            .unwrap();
        assert_eq!(extracted.cv.skills.technical, vec!["Rust", "tokio"]);
        assert!(!extracted.context.is_empty());
        assert!(!to_dict(&extracted.cv).unwrap().contains_key("analysis"));
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_any_provider_call() {
        let llm = scripted();
        let pipeline = pipeline(llm);
        let err = pipeline.tailor("short", "Senior Rust engineer wanted").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_generation_is_format_error() {
        let llm = ScriptedCompletion::new().reply("Full CV Text", "I cannot help with that.");
        let err = pipeline(llm)
            .tailor(&words("word", 80), "Senior Rust engineer wanted")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFormat(_)));
    }

    #[tokio::test]
    async fn test_structural_violation_is_transformation_error() {
        let llm = ScriptedCompletion::new().reply("Full CV Text", r#"{"experience": "ten years"}"#);
        let err = pipeline(llm)
            .tailor(&words("word", 80), "Senior Rust engineer wanted")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Transformation(_)));
    }
}
