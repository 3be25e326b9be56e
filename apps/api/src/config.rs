use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client;

/// Application configuration loaded from environment variables.
/// Provider credentials are checked when the LLM client is built, not here.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub generation_model: String,
    pub evaluation_model: String,
    pub vision_model: String,
    pub transcription_model: String,
    pub embedding_model: String,
    pub llm_timeout_secs: u64,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieval_k: usize,
    pub evaluation_personas: Vec<String>,
    pub enable_retrieval_metrics: bool,
    pub templates_dir: String,
    pub pdf_render_command: String,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

pub const DEFAULT_PERSONAS: [&str; 3] = [
    "Strict Hiring Manager",
    "Creative Recruiter",
    "Senior Technical Lead",
];

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let chunk_size: usize = parse_env("CHUNK_SIZE", 1000)?;
        let chunk_overlap: usize = parse_env("CHUNK_OVERLAP", 200)?;
        anyhow::ensure!(chunk_size > 0, "CHUNK_SIZE must be greater than zero");
        anyhow::ensure!(
            chunk_overlap < chunk_size,
            "CHUNK_OVERLAP ({chunk_overlap}) must be smaller than CHUNK_SIZE ({chunk_size})"
        );

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            openai_base_url: env_or("OPENAI_BASE_URL", llm_client::DEFAULT_BASE_URL),
            generation_model: env_or("GENERATION_MODEL", llm_client::DEFAULT_CHAT_MODEL),
            evaluation_model: env_or("EVALUATION_MODEL", llm_client::DEFAULT_CHAT_MODEL),
            vision_model: env_or("VISION_MODEL", llm_client::DEFAULT_CHAT_MODEL),
            transcription_model: env_or(
                "TRANSCRIPTION_MODEL",
                llm_client::DEFAULT_TRANSCRIPTION_MODEL,
            ),
            embedding_model: env_or("EMBEDDING_MODEL", llm_client::DEFAULT_EMBEDDING_MODEL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            chunk_size,
            chunk_overlap,
            retrieval_k: parse_env("RETRIEVAL_K", 7)?,
            evaluation_personas: std::env::var("EVALUATION_PERSONAS")
                .ok()
                .map(|raw| split_list(&raw))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(|| DEFAULT_PERSONAS.iter().map(|p| p.to_string()).collect()),
            enable_retrieval_metrics: parse_env("ENABLE_RETRIEVAL_METRICS", false)?,
            templates_dir: env_or("TEMPLATES_DIR", "./templates"),
            pdf_render_command: env_or("PDF_RENDER_COMMAND", "wkhtmltopdf"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            cors_origins: split_list(&env_or("CORS_ORIGINS", "*")),
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
