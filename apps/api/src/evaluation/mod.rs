// Two-track evaluation of a tailored CV: retrieval-quality metrics and a persona
// committee, joined by the orchestrator.

pub mod committee;
pub mod handlers;
pub mod metrics;
pub mod orchestrator;
pub mod prompts;
