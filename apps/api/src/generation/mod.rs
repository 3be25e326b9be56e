// CV generation: structured extraction, transformation into typed records,
// section rephrasing and the tailoring pipeline.
// All LLM calls go through the llm_client provider traits.

pub mod extractor;
pub mod handlers;
pub mod prompts;
pub mod rephrase;
pub mod tailor;
pub mod transform;
