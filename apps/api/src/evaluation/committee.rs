//! Persona committee: N independent LLM judges scoring a CV against a job description.
//!
//! All persona calls are dispatched at once and joined. A judge whose call fails or
//! whose reply is unusable still contributes an entry (score 0), and invalid scores
//! count as 0 in the average rather than being dropped.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};

use crate::evaluation::prompts::PERSONA_PROMPT_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, CompletionProvider, ResponseFormat};
use crate::models::evaluation::{CommitteeEvaluation, PersonaEvaluation};

pub struct Committee {
    llm: Arc<dyn CompletionProvider>,
    personas: Vec<String>,
}

impl Committee {
    pub fn new(llm: Arc<dyn CompletionProvider>, personas: Vec<String>) -> Self {
        Self { llm, personas }
    }

    pub fn personas(&self) -> &[String] {
        &self.personas
    }

    /// Scores `cv_content` with every persona, in persona order.
    pub async fn evaluate(&self, job_description: &str, cv_content: &str) -> CommitteeEvaluation {
        let calls = self
            .personas
            .iter()
            .map(|persona| judge(self.llm.as_ref(), persona, job_description, cv_content));
        let individual_evaluations = join_all(calls).await;

        let average_score = average_score(&individual_evaluations);
        info!(
            "Committee evaluation complete: {} judges, average_score={average_score}",
            individual_evaluations.len()
        );

        CommitteeEvaluation {
            individual_evaluations,
            average_score,
        }
    }
}

async fn judge(
    llm: &dyn CompletionProvider,
    persona: &str,
    job_description: &str,
    cv_content: &str,
) -> PersonaEvaluation {
    let prompt = PERSONA_PROMPT_TEMPLATE
        .replace("{persona}", persona)
        .replace("{job_description}", job_description)
        .replace("{cv_content}", cv_content);

    let reply = match llm
        .complete(&prompt, JSON_ONLY_SYSTEM, ResponseFormat::JsonObject)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Persona '{persona}' evaluation failed: {e}");
            return unavailable(persona, &e.to_string());
        }
    };

    match serde_json::from_str::<Value>(strip_json_fences(&reply)) {
        Ok(value) => evaluation_from_value(persona, &value),
        Err(e) => {
            warn!("Persona '{persona}' returned invalid JSON: {e}");
            unavailable(persona, &format!("reply was not valid JSON ({e})"))
        }
    }
}

fn unavailable(persona: &str, reason: &str) -> PersonaEvaluation {
    PersonaEvaluation {
        persona: persona.to_string(),
        score: 0.0,
        justification: format!("Evaluation unavailable: {reason}"),
    }
}

fn evaluation_from_value(requested: &str, value: &Value) -> PersonaEvaluation {
    let persona = value
        .get("persona")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(requested)
        .to_string();

    let score = score_from_value(value.get("score"));
    if value.get("score").and_then(Value::as_f64).is_none() {
        warn!("Persona '{requested}' returned no numeric score; counting it as 0");
    }

    let justification = match value.get("justification") {
        Some(Value::String(s)) => s.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };

    PersonaEvaluation {
        persona,
        score,
        justification,
    }
}

/// Only finite JSON numbers are valid scores; everything else is 0.
pub fn score_from_value(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|s| s.is_finite())
        .unwrap_or(0.0)
}

/// Mean of all scores rounded to 2 decimals; 0.0 for an empty committee.
pub fn average_score(evaluations: &[PersonaEvaluation]) -> f64 {
    if evaluations.is_empty() {
        return 0.0;
    }
    let total: f64 = evaluations
        .iter()
        .map(|e| if e.score.is_finite() { e.score } else { 0.0 })
        .sum();
    let mean = total / evaluations.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stubs::ScriptedCompletion;
    use serde_json::json;

    fn personas() -> Vec<String> {
        ["Strict Hiring Manager", "Creative Recruiter", "Senior Technical Lead"]
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    fn eval(score: f64) -> PersonaEvaluation {
        PersonaEvaluation {
            persona: "p".to_string(),
            score,
            justification: String::new(),
        }
    }

    #[test]
    fn test_invalid_scores_count_as_zero_in_denominator() {
        let llm_values = [json!({"score": 8}), json!({"score": "bad"}), json!({})];
        let evaluations: Vec<_> = llm_values
            .iter()
            .map(|v| evaluation_from_value("p", v))
            .collect();
        assert_eq!(average_score(&evaluations), 2.67);
    }

    #[test]
    fn test_average_ignores_non_finite_values() {
        assert_eq!(average_score(&[eval(8.0), eval(f64::NAN), eval(0.0)]), 2.67);
        assert_eq!(average_score(&[eval(f64::INFINITY), eval(6.0)]), 3.0);
    }

    #[test]
    fn test_empty_committee_averages_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }

    #[test]
    fn test_blank_persona_is_replaced_with_requested() {
        let e = evaluation_from_value("Creative Recruiter", &json!({"persona": " ", "score": 7.5}));
        assert_eq!(e.persona, "Creative Recruiter");
        assert_eq!(e.score, 7.5);
    }

    #[tokio::test]
    async fn test_committee_runs_every_persona_in_order() {
        let llm = ScriptedCompletion::new()
            .reply(
                "act as: Strict Hiring Manager",
                r#"{"persona": "Strict Hiring Manager", "score": 8, "justification": "Solid."}"#,
            )
            .reply("act as: Creative Recruiter", r#"{"persona": "Creative Recruiter", "score": "bad"}"#)
            .reply("act as: Senior Technical Lead", r#"{"persona": "Senior Technical Lead", "score": NaN}"#);
        let committee = Committee::new(Arc::new(llm), personas());

        let result = committee.evaluate("jd", "{}").await;

        let names: Vec<_> = result
            .individual_evaluations
            .iter()
            .map(|e| e.persona.as_str())
            .collect();
        assert_eq!(names, personas());
        assert_eq!(result.individual_evaluations[0].justification, "Solid.");
        assert_eq!(result.individual_evaluations[1].score, 0.0);
        assert_eq!(result.individual_evaluations[2].score, 0.0);
        assert_eq!(result.average_score, 2.67);
    }

    #[tokio::test]
    async fn test_failed_persona_call_is_absorbed() {
        let llm = ScriptedCompletion::new()
            .reply("act as: Strict Hiring Manager", r#"{"score": 9}"#)
            .fail("act as: Creative Recruiter", 503)
            .reply("act as: Senior Technical Lead", r#"{"score": 6}"#);
        let committee = Committee::new(Arc::new(llm), personas());

        let result = committee.evaluate("jd", "{}").await;

        assert_eq!(result.individual_evaluations.len(), 3);
        assert_eq!(result.individual_evaluations[0].persona, "Strict Hiring Manager");
        assert!(result.individual_evaluations[1]
            .justification
            .starts_with("Evaluation unavailable"));
        assert_eq!(result.average_score, 5.0);
    }
}
