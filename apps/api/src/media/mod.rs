// Thin wrappers over the provider's transcription and vision endpoints.

pub mod handlers;

pub const JD_IMAGE_INSTRUCTION: &str = "Analyze this image of a job description. \
Extract the key responsibilities and required skills. \
Return the result as a clean block of text.";
