//! LLM Client — the single point of entry for completion calls in schemagen.
//!
//! Every request carries a JSON Schema response format rendered from the
//! active `SchemaNode` tree. One attempt per request: failures are logged and
//! handed back as `Err` for the materializer to tag.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::schema::json_schema::to_response_format;
use crate::schema::SchemaNode;

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-2024-08-06";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport failure: {}", error_chain(.0))]
    Http(#[from] reqwest::Error),

    #[error("remote failure (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed response envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("response contained no choices")]
    NoChoices,

    #[error("response contained no message content")]
    EmptyContent,

    #[error("model refused the request: {0}")]
    Refusal(String),
}

/// Outcome of a single completion request: the raw structured payload.
pub type CompletionResult = Result<String, TransportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model_id: String,
    pub messages: Vec<Message>,
    pub schema: SchemaNode,
    /// Reject fields the schema does not declare.
    pub strict: bool,
}

/// The remote completion boundary. `OpenAiTransport` talks HTTP; tests plug
/// in scripted transports.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult;
}

/// Sends `request` once through `transport` and returns the raw payload.
pub async fn request_completion(
    transport: &dyn CompletionTransport,
    request: &CompletionRequest,
) -> CompletionResult {
    info!(
        "Requesting structured completion (model: {}, schema: {}, strict: {})",
        request.model_id, request.schema.name, request.strict
    );

    match transport.complete(request).await {
        Ok(payload) => {
            debug!("Completion returned {} bytes of structured payload", payload.len());
            Ok(payload)
        }
        Err(e) => {
            error!("Completion request failed: {e}");
            Err(e)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI-compatible chat completions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonSchema { json_schema: Value },
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
    /// Present when the provider already parsed the output against the schema.
    parsed: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiTransport {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        let body = ChatCompletionRequest {
            model: &request.model_id,
            messages: &request.messages,
            response_format: ResponseFormat::JsonSchema {
                json_schema: to_response_format(&request.schema, request.strict),
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(TransportError::Envelope)?;

        if let Some(usage) = &envelope.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        extract_payload(envelope)
    }
}

/// Pulls the single structured payload out of the first choice.
fn extract_payload(envelope: ChatCompletionResponse) -> CompletionResult {
    let message = envelope
        .choices
        .into_iter()
        .next()
        .ok_or(TransportError::NoChoices)?
        .message;

    if let Some(parsed) = message.parsed.filter(|v| !v.is_null()) {
        return Ok(parsed.to_string());
    }

    if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(TransportError::Refusal(refusal));
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => Ok(strip_json_fences(&content).to_string()),
        _ => Err(TransportError::EmptyContent),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
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

/// Joins an error and its sources, so "connection refused" survives wrapping.
fn error_chain(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}
