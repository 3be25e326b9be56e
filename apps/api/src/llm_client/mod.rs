/// LLM Client: the single point of entry for every upstream AI call in the service.
///
/// Chat completions, embeddings, audio transcription and image analysis all go through
/// `LlmClient`. Pipeline components depend on the `CompletionProvider` and
/// `EmbeddingProvider` traits instead, so tests can swap in stubs.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;
#[cfg(test)]
pub mod stubs;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider credentials are not configured (set OPENAI_API_KEY)")]
    MissingCredentials,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Embedding count mismatch: sent {sent} texts, received {received} vectors")]
    EmbeddingCount { sent: usize, received: usize },
}

/// Output shape requested from a chat completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Text generation seam used by the generator, the rephraser and the committee.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        format: ResponseFormat,
    ) -> Result<String, LlmError>;
}

/// Embedding seam used by the similarity index.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns one vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<WireResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Models used for each kind of upstream call.
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub chat: String,
    pub embedding: String,
    pub transcription: String,
    pub vision: String,
}

/// OpenAI-compatible HTTP client with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    models: ModelSet,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: String,
        models: ModelSet,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredentials);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            models,
        })
    }

    /// Builds the client from configuration. Missing credentials are a hard failure.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or(LlmError::MissingCredentials)?;
        Self::new(
            api_key,
            config.openai_base_url.clone(),
            ModelSet {
                chat: config.generation_model.clone(),
                embedding: config.embedding_model.clone(),
                transcription: config.transcription_model.clone(),
                vision: config.vision_model.clone(),
            },
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    /// Same connection pool, different chat model.
    pub fn with_chat_model(&self, model: &str) -> Self {
        let mut client = self.clone();
        client.models.chat = model.to_string();
        client
    }

    pub fn chat_model(&self) -> &str {
        &self.models.chat
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a request built by `build`, retrying on 429, 5xx and transport errors
    /// with exponential backoff. Other non-success statuses fail immediately.
    async fn send_with_retry<F>(&self, build: F) -> Result<Response, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().bearer_auth(&self.api_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Makes a chat completion call, returning the full response object.
    pub async fn chat(
        &self,
        prompt: &str,
        system: &str,
        format: ResponseFormat,
    ) -> Result<ChatResponse, LlmError> {
        let temperature = match format {
            ResponseFormat::JsonObject => 0.0,
            ResponseFormat::Text => 0.7,
        };
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: MessageContent::Text(system),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Text(prompt),
        });
        let body = ChatRequest {
            model: &self.models.chat,
            max_tokens: MAX_TOKENS,
            temperature,
            messages,
            response_format: match format {
                ResponseFormat::JsonObject => Some(WireResponseFormat {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        };

        let url = self.url("chat/completions");
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                self.models.chat, usage.prompt_tokens, usage.completion_tokens
            );
        }
        Ok(chat)
    }

    /// Transcribes an audio upload to text.
    pub async fn transcribe(&self, audio: Bytes, filename: &str) -> Result<String, LlmError> {
        let url = self.url("audio/transcriptions");
        let response = self
            .send_with_retry(|| {
                let part = reqwest::multipart::Part::stream(audio.clone())
                    .file_name(filename.to_string());
                let form = reqwest::multipart::Form::new()
                    .text("model", self.models.transcription.clone())
                    .part("file", part);
                self.client.post(&url).multipart(form)
            })
            .await?;
        let transcription: TranscriptionResponse = response.json().await?;
        Ok(transcription.text)
    }

    /// Sends a base64-encoded image with an instruction to a vision-capable model.
    pub async fn describe_image(
        &self,
        image_base64: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.models.vision,
            max_tokens: 1000,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{mime_type};base64,{image_base64}"),
                        },
                    },
                ]),
            }],
            response_format: None,
        };
        let url = self.url("chat/completions");
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let chat: ChatResponse = response.json().await?;
        chat.text()
            .map(|t| t.trim().to_string())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        format: ResponseFormat,
    ) -> Result<String, LlmError> {
        let response = self.chat(prompt, system, format).await?;
        response
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl EmbeddingProvider for LlmClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbeddingRequest {
            model: &self.models.embedding,
            input: texts,
        };
        let url = self.url("embeddings");
        let response = self
            .send_with_retry(|| self.client.post(&url).json(&body))
            .await?;
        let mut parsed: EmbeddingResponse = response.json().await?;

        if parsed.data.len() != texts.len() {
            return Err(LlmError::EmbeddingCount {
                sent: texts.len(),
                received: parsed.data.len(),
            });
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
