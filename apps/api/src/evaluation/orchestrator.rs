//! Evaluation Orchestrator: runs retrieval metrics and the persona committee
//! concurrently and joins them. Each track owns its fallback, so neither can fail the
//! other.

use std::sync::Arc;

use tracing::{info, warn};

use crate::evaluation::committee::Committee;
use crate::evaluation::metrics::{reference_answer, RetrievalScorer};
use crate::models::evaluation::{EvaluationResult, RetrievalMetrics};
use crate::retrieval::index::RetrievedContext;

pub struct Evaluator {
    scorer: Arc<dyn RetrievalScorer>,
    committee: Committee,
}

impl Evaluator {
    pub fn new(scorer: Arc<dyn RetrievalScorer>, committee: Committee) -> Self {
        Self { scorer, committee }
    }

    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    pub async fn evaluate(
        &self,
        job_description: &str,
        cv_content: &str,
        context: &RetrievedContext,
    ) -> EvaluationResult {
        let (ragas_scores, committee_evaluation) = tokio::join!(
            self.retrieval_metrics(job_description, cv_content, context),
            self.committee.evaluate(job_description, cv_content),
        );

        EvaluationResult {
            ragas_scores,
            committee_evaluation,
        }
    }

    /// Track A. Empty context or a scorer failure yields all zeros.
    async fn retrieval_metrics(
        &self,
        job_description: &str,
        cv_content: &str,
        context: &RetrievedContext,
    ) -> RetrievalMetrics {
        if context.is_empty() {
            info!("No retrieved context; skipping retrieval metrics");
            return RetrievalMetrics::zero();
        }

        let result = self
            .scorer
            .score(
                job_description,
                &context.texts(),
                cv_content,
                &reference_answer(job_description),
            )
            .await;

        match result {
            Ok(metrics) => {
                let metrics = metrics.sanitized();
                info!(
                    "Retrieval metrics ({}): faithfulness={:.2}, answer_relevancy={:.2}, context_precision={:.2}, context_recall={:.2}",
                    self.scorer.name(),
                    metrics.faithfulness,
                    metrics.answer_relevancy,
                    metrics.context_precision,
                    metrics.context_recall
                );
                metrics
            }
            Err(e) => {
                warn!("Retrieval metrics failed ({}): {e}", self.scorer.name());
                RetrievalMetrics::zero()
            }
        }
    }
}
