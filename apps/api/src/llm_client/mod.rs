/// LLM Client — the single point of entry for all upstream model calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Primary model unless overridden by `ADVISOR_MODEL`.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
/// Secondary model tried only when the primary fails its startup health check.
pub const DEFAULT_FALLBACK_MODEL: &str = "claude-haiku-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const HEALTH_CHECK_PROMPT: &str = "Reply with the single word OK.";

#[derive(Debug, Error)]
pub enum LlmError {
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
}

/// Turn author. Mirrors the Messages API role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of an upstream conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// An append-only upstream conversation handle.
///
/// The Messages API is stateless, so the full turn log is resubmitted on
/// every exchange. The owner is responsible for serializing access; this
/// type only records completed exchanges — a failed call leaves it unchanged.
#[derive(Debug, Clone)]
pub struct Conversation {
    system: String,
    turns: Vec<ChatTurn>,
}

impl Conversation {
    /// Creates a handle pre-seeded with context turns. Seeding is pure data
    /// injection; no model call happens here.
    pub fn new(system: impl Into<String>, seed: Vec<ChatTurn>) -> Self {
        Self {
            system: system.into(),
            turns: seed,
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Records a completed exchange: the user message followed by the
    /// assistant reply.
    pub fn record_exchange(&mut self, user_message: &str, assistant_reply: &str) {
        self.turns.push(ChatTurn::user(user_message));
        self.turns.push(ChatTurn::assistant(assistant_reply));
    }
}

/// The upstream model seam. The advisor engine and the prompting tools
/// depend on this trait (as `Arc<dyn ModelClient>`) rather than the concrete
/// client, so tests can script or fail the upstream.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Whether the client holds a usable credential. Checked exactly once,
    /// at engine construction.
    fn is_configured(&self) -> bool {
        true
    }

    /// One-shot prompt → text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Stateful-style exchange: submits the prior turns plus `message` and
    /// returns the assistant text. The caller owns the turn log.
    async fn exchange(
        &self,
        system: &str,
        turns: &[ChatTurn],
        message: &str,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Wraps the Anthropic Messages API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    fallback_model: String,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, fallback_model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            model,
            fallback_model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a credential was supplied. Checked once at engine
    /// construction; an empty key is a fatal configuration error.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Startup health check: verifies the configured model answers and
    /// switches to the configured fallback if it does not. Never scans the
    /// provider's model list. If both models fail, the primary is kept and
    /// per-call degradation takes over from there.
    pub async fn with_healthy_model(self) -> Self {
        let primary = self.call(HEALTH_CHECK_PROMPT, "You are a health check.").await;
        match primary {
            Ok(_) => {
                info!("Model '{}' passed startup health check", self.model);
                self
            }
            Err(primary_err) => {
                warn!(
                    "Model '{}' failed startup health check: {primary_err}; trying fallback '{}'",
                    self.model, self.fallback_model
                );
                let mut with_fallback = self.clone();
                with_fallback.model = self.fallback_model.clone();
                let fallback = with_fallback
                    .call(HEALTH_CHECK_PROMPT, "You are a health check.")
                    .await;
                match fallback {
                    Ok(_) => {
                        info!("Switched to fallback model '{}'", with_fallback.model);
                        with_fallback
                    }
                    Err(fallback_err) => {
                        warn!(
                            "Fallback model '{}' also failed health check: {fallback_err}; \
                             keeping '{}'",
                            self.fallback_model, self.model
                        );
                        self
                    }
                }
            }
        }
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn call_messages(
        &self,
        system: &str,
        messages: Vec<AnthropicMessage<'_>>,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
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
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Single user prompt → full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let messages = vec![AnthropicMessage {
            role: "user",
            content: prompt,
        }];
        self.call_messages(system, messages).await
    }

}

#[async_trait]
impl ModelClient for LlmClient {
    fn is_configured(&self) -> bool {
        self.has_credentials()
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }

    async fn exchange(
        &self,
        system: &str,
        turns: &[ChatTurn],
        message: &str,
    ) -> Result<String, LlmError> {
        let mut messages: Vec<AnthropicMessage<'_>> = turns
            .iter()
            .map(|t| AnthropicMessage {
                role: t.role.as_str(),
                content: &t.content,
            })
            .collect();
        messages.push(AnthropicMessage {
            role: "user",
            content: message,
        });

        let response = self.call_messages(system, messages).await?;
        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
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
