use serde::{Deserialize, Serialize};

/// Four retrieval-quality metrics, each in [0, 1]. Unavailable values are 0.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub faithfulness: f64,
    pub answer_relevancy: f64,
    pub context_precision: f64,
    pub context_recall: f64,
}

impl RetrievalMetrics {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Replaces NaN/Infinity with 0.0 and clamps every metric into [0, 1].
    pub fn sanitized(self) -> Self {
        Self {
            faithfulness: unit_interval(self.faithfulness),
            answer_relevancy: unit_interval(self.answer_relevancy),
            context_precision: unit_interval(self.context_precision),
            context_recall: unit_interval(self.context_recall),
        }
    }
}

fn unit_interval(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One persona's verdict. `score` is always a finite number (invalid scores become 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaEvaluation {
    pub persona: String,
    pub score: f64,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitteeEvaluation {
    pub individual_evaluations: Vec<PersonaEvaluation>,
    pub average_score: f64,
}

/// Combined output of both evaluation tracks, attached to a tailored CV as `analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub ragas_scores: RetrievalMetrics,
    pub committee_evaluation: CommitteeEvaluation,
}
