// LLM prompt constants for the evaluation tracks.

/// Persona judge prompt. Replace `{persona}`, `{job_description}` and `{cv_content}`.
pub const PERSONA_PROMPT_TEMPLATE: &str = r#"You will act as: {persona}.
Your task is to score the provided CV against the job description from this perspective.
Return a JSON object with exactly these keys:
- "persona": string
- "score": number from 1 to 10
- "justification": string, two to four sentences
IMPORTANT: The "persona" field must exactly match the role you are acting as: "{persona}". Do not use any other name or value for this field.

JOB:
{job_description}

CV:
{cv_content}"#;

pub const METRICS_SYSTEM: &str = "You are a strict evaluator of retrieval-augmented \
    generation quality. You MUST respond with valid JSON only.";

/// LLM-judged retrieval metrics. Replace `{question}`, `{contexts}`, `{answer}` and
/// `{ground_truth}`.
pub const METRICS_PROMPT_TEMPLATE: &str = r#"Score how well an answer is grounded in retrieved context.

QUESTION:
{question}

RETRIEVED CONTEXTS (numbered, in rank order):
{contexts}

ANSWER:
{answer}

REFERENCE:
{ground_truth}

Return a JSON object with four numbers between 0 and 1:
{
  "faithfulness": fraction of claims in the answer supported by the contexts,
  "answer_relevancy": how directly the answer addresses the question,
  "context_precision": fraction of contexts that are relevant, weighted toward higher ranks,
  "context_recall": fraction of the reference covered by the contexts
}"#;

/// Ground-truth sentence given to the metrics engine. Replace `{job_description}`.
pub const REFERENCE_ANSWER_TEMPLATE: &str =
    "Based on the job description: {job_description}, the CV should highlight relevant skills and experience.";
