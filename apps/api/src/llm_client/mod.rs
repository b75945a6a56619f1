/// LLM Client: the single point of entry for all chat-completion calls in SkillBridge.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// Handlers and the interview driver depend on the `Oracle` trait, never on reqwest.
///
/// Model: google/gemini-2.0-flash-001 via OpenRouter (hardcoded, do not make configurable)
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The model used for all completion calls in SkillBridge.
pub const MODEL: &str = "google/gemini-2.0-flash-001";

/// Categorized completion failure. The caller decides how to render it.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// The remote text generator, seen as a function from a conversation to a reply.
///
/// Carried in `AppState` as `Arc<dyn Oracle>`.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;

    /// Wraps a single prompt into a one-message user conversation.
    async fn complete_prompt(&self, prompt: &str) -> Result<String, CompletionError> {
        self.complete(&[ChatMessage::user(prompt)]).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    #[serde(rename = "type")]
    part_type: &'static str,
    text: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        WireMessage {
            role: message.role,
            content: [TextPart {
                part_type: "text",
                text: &message.text,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

/// OpenRouter chat-completion client. One POST per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
}

impl LlmClient {
    /// `timeout` of `None` leaves outbound calls unbounded.
    pub fn new(
        api_key: &str,
        site_url: &str,
        site_name: &str,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .context("completion API key is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "HTTP-Referer",
            HeaderValue::from_str(site_url).context("SITE_URL is not a valid header value")?,
        );
        headers.insert(
            "X-Title",
            HeaderValue::from_str(site_name).context("SITE_NAME is not a valid header value")?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            base_url: OPENROUTER_API_URL.to_string(),
        })
    }

    /// Overrides the endpoint URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }
}

#[async_trait]
impl Oracle for LlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: messages.iter().map(WireMessage::from).collect(),
        };

        debug!(
            "Completion request: {} messages, {} chars",
            messages.len(),
            messages.iter().map(|m| m.text.len()).sum::<usize>()
        );

        let response = self
            .client
            .post(&self.base_url)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Completion API returned {}: {}", status, message);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| CompletionError::MalformedResponse(format!("invalid JSON: {e}")))?;

        // OpenRouter reports some upstream failures as a 200 with an error object.
        if let Some(error) = parsed.error {
            return Err(CompletionError::Api {
                status: error.code.unwrap_or(status.as_u16()),
                message: error.message,
            });
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::MalformedResponse("no choices returned".to_string()))?
            .message
            .content
            .ok_or_else(|| {
                CompletionError::MalformedResponse("first choice has no content".to_string())
            })?;

        debug!("Completion succeeded: {} chars", text.len());
        Ok(text)
    }
}
