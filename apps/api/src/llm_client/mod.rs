//! LLM Client: the single point of entry for text-generation calls.
//!
//! No other module talks to the completion service directly. Every call is
//! schema-constrained and the reply is parsed strictly: either a complete value of
//! the requested type comes back or an error does.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

/// Low temperature: grounded summaries, not creative writing.
pub const TEMPERATURE: f32 = 0.2;
pub const MAX_OUTPUT_TOKENS: u32 = 1200;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing OPENAI_API_KEY secret")]
    NotConfigured,

    #[error("OpenAI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Empty OpenAI response")]
    EmptyContent,

    #[error("Failed to parse OpenAI JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NotConfigured => AppError::Configuration(e.to_string()),
            LlmError::Api { status, message } => {
                tracing::warn!("Generation API returned {status}");
                AppError::Generation(message)
            }
            other => AppError::Generation(other.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (OpenAI Responses API)
// ────────────────────────────────────────────────────────────────────────────

/// A named JSON schema the model output must satisfy.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
    pub name: &'static str,
    pub strict: bool,
    pub schema: Value,
}

impl JsonSchemaFormat {
    pub fn strict(name: &'static str, schema: Value) -> Self {
        Self {
            format_type: "json_schema",
            name,
            strict: true,
            schema,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub text: TextConfig<'a>,
    pub input: Vec<InputMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TextConfig<'a> {
    pub format: &'a JsonSchemaFormat,
}

#[derive(Debug, Serialize)]
pub struct InputMessage<'a> {
    pub role: &'a str,
    pub content: Vec<InputText<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InputText<'a> {
    #[serde(rename = "type")]
    pub part_type: &'a str,
    pub text: &'a str,
}

impl<'a> InputMessage<'a> {
    fn text(role: &'a str, text: &'a str) -> Self {
        Self {
            role,
            content: vec![InputText {
                part_type: "input_text",
                text,
            }],
        }
    }
}

/// Status plus decoded JSON body of a completion call. A body that is not JSON
/// decodes to `Value::Null`.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub body: Value,
}

/// Transport to the completion service.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn create_response(
        &self,
        api_key: &str,
        request: &ResponsesRequest<'_>,
    ) -> Result<BackendReply, LlmError>;
}

/// `reqwest` transport for `POST {base_url}/responses`.
pub struct OpenAiBackend {
    client: Client,
    endpoint: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: format!("{}/responses", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn create_response(
        &self,
        api_key: &str,
        request: &ResponsesRequest<'_>,
    ) -> Result<BackendReply, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(BackendReply { status, body })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client. Holds the credential and model read at startup.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn LlmBackend>,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn LlmBackend>, api_key: Option<String>, model: String) -> Self {
        Self {
            backend,
            api_key,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fails with `NotConfigured` when no credential is present.
    pub fn ensure_configured(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::NotConfigured)
    }

    /// Runs a schema-constrained completion and deserializes the output as `T`.
    /// Missing text, an error status, or output that does not deserialize is an error.
    pub async fn generate<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
        format: &JsonSchemaFormat,
    ) -> Result<T, LlmError> {
        let api_key = self.ensure_configured()?;

        let request = ResponsesRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            text: TextConfig { format },
            input: vec![
                InputMessage::text("system", system),
                InputMessage::text("user", user),
            ],
        };

        info!("Calling generation model {} ({})", self.model, format.name);
        let reply = self.backend.create_response(api_key, &request).await?;

        if !(200..300).contains(&reply.status) {
            let message = reply
                .body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("OpenAI request failed")
                .to_string();
            return Err(LlmError::Api {
                status: reply.status,
                message,
            });
        }

        if let Some(usage) = reply.body.get("usage") {
            debug!(
                "Generation usage: input_tokens={}, output_tokens={}",
                usage["input_tokens"], usage["output_tokens"]
            );
        }

        let text = extract_output_text(&reply.body).ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
    }
}

/// Finds the generated text in a Responses envelope. Checked in order: the
/// top-level `output_text`, the first `output_text` part of any output item, then
/// `output[0].content[0].text`. Blank text counts as absent.
pub fn extract_output_text(body: &Value) -> Option<&str> {
    non_blank(body.get("output_text"))
        .or_else(|| {
            body.get("output")?
                .as_array()?
                .iter()
                .filter_map(|item| item.get("content")?.as_array())
                .flatten()
                .find(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
                .and_then(|part| non_blank(part.get("text")))
        })
        .or_else(|| non_blank(body.pointer("/output/0/content/0/text")))
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
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
