// Shared prompt fragments. Each module that calls the LLM keeps its own prompts.rs
// alongside it; only cross-cutting pieces live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Accepted date display strings, shared by every prompt that asks for CV dates.
pub const DATE_FORMAT_RULES: &str = "\
Important date formatting guidelines:
- Use \"Present\" or \"Current\" for ongoing positions/education
- Use formats like \"Jan 2023\", \"2023\", \"Sep 2020 - May 2023\"
- If only year is available, use just the year (e.g., \"2023\")
- If month and year are available, use \"Jan 2023\" format (three-letter month)";
