//! Generation client — the single point of entry for all AI calls.
//!
//! Wraps an OpenAI-compatible chat-completions endpoint with retry
//! logic. `generate` never fails: after the retry budget is exhausted
//! it returns a user-facing apology string keyed to the last failure,
//! so the conversation layer can always just send whatever comes back.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub const AI_API_URL: &str = "https://api.intelligence.io.solutions/api/v1/chat/completions";
/// The model used for all generation calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const AI_MODEL: &str = "deepseek-ai/DeepSeek-R1-0528";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_RETRIES: u32 = 3;

/// The model may emit internal reasoning wrapped in <think> tags;
/// it must never reach the user.
static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think regex"));

const APOLOGY_PARSE: &str = "Извините, не удалось обработать ответ AI. Попробуйте позже.";
const APOLOGY_TIMEOUT: &str = "Извините, превышено время ожидания ответа. Попробуйте позже.";
const APOLOGY_CONNECTION: &str = "Извините, ошибка соединения с сервером. Попробуйте позже.";
const APOLOGY_EXHAUSTED: &str = "Извините, не удалось получить ответ после нескольких попыток.";

/// Why a single generation attempt failed. Each category maps to its
/// own apology string once all retries are spent.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("response body did not match the expected shape")]
    Parse,

    #[error("API returned status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),
}

impl GenerationFailure {
    fn apology(&self) -> String {
        match self {
            GenerationFailure::Parse => APOLOGY_PARSE.to_string(),
            GenerationFailure::Status(code) => {
                format!("Извините, API временно недоступен (код {code}). Попробуйте позже.")
            }
            GenerationFailure::Timeout => APOLOGY_TIMEOUT.to_string(),
            GenerationFailure::Connection(_) => APOLOGY_CONNECTION.to_string(),
        }
    }
}

/// Seam the conversation engine depends on, so tests can swap in a
/// scripted generator instead of the network client.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Resolves to either cleaned generated text or a user-facing
    /// apology string. Never errors.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> String;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// The single generation client used by the whole bot.
#[derive(Clone)]
pub struct GenerationClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl GenerationClient {
    pub fn new(api_key: String) -> Self {
        Self::with_api_url(api_key, AI_API_URL)
    }

    /// Points the client at a non-default endpoint. Used by tests and
    /// self-hosted gateways.
    pub fn with_api_url(api_key: String, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_url: api_url.into(),
            api_key,
        }
    }

    async fn attempt(&self, request: &ChatRequest<'_>) -> Result<String, GenerationFailure> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationFailure::Timeout
                } else {
                    GenerationFailure::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Generation API returned {status}: {body}");
            return Err(GenerationFailure::Status(status.as_u16()));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationFailure::Timeout
            } else if e.is_decode() {
                GenerationFailure::Parse
            } else {
                GenerationFailure::Connection(e.to_string())
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GenerationFailure::Parse)?;

        Ok(strip_think_blocks(&content))
    }
}

#[async_trait]
impl ReplyGenerator for GenerationClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> String {
        let request = ChatRequest {
            model: AI_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let mut last_failure: Option<GenerationFailure> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Generation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&request).await {
                Ok(content) => {
                    debug!("Generation succeeded on attempt {}", attempt + 1);
                    return content;
                }
                Err(failure) => {
                    error!("Generation attempt {} failed: {failure}", attempt + 1);
                    last_failure = Some(failure);
                }
            }
        }

        last_failure
            .map(|f| f.apology())
            .unwrap_or_else(|| APOLOGY_EXHAUSTED.to_string())
    }
}

/// Strips `<think>...</think>` reasoning blocks (non-greedy, spans
/// newlines) and trims surrounding whitespace.
fn strip_think_blocks(text: &str) -> String {
    THINK_RE.replace_all(text, "").trim().to_string()
}
