//! Generative Backend
//!
//! The trait every dialogue and grading call goes through, plus the
//! concrete client for a local Ollama server's native chat endpoint.
//! Calls are bounded by the client's timeout and are never retried here;
//! the orchestrator and analyzer each decide what a failure means for
//! their caller.

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Originator of a chat message as the backend sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn as_wire_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message of backend-visible history. Candidate turns map to `User`,
/// evaluator turns to `Assistant`; the system instruction travels
/// separately and is prepended on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Generation parameters passed through to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub num_predict: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingOptions {
    /// Settings for dialogue turns: enough tokens for one full question,
    /// sampled loosely.
    pub fn dialogue() -> Self {
        Self {
            num_predict: 60,
            temperature: 0.7,
            top_p: Some(0.9),
        }
    }

    /// Settings for grading: room for the full report and a low
    /// temperature for consistent JSON.
    pub fn grading() -> Self {
        Self {
            num_predict: 1000,
            temperature: 0.2,
            top_p: None,
        }
    }
}

/// Failures surfacing from a backend call.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("backend returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("backend response unreadable: {0}")]
    InvalidResponse(String),
}

/// A text-generation service invoked for both dialogue turns and grading.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Makes a single, non-streaming generation call.
    async fn generate(
        &self,
        system_instruction: &str,
        messages: &[ChatMessage],
        options: SamplingOptions,
    ) -> Result<String, BackendError>;
}

// --- Ollama wire types ---

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaWireMessage<'a>>,
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct OllamaWireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

/// `GenerativeBackend` implementation for Ollama's native `/api/chat`.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for an Ollama server.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. "http://localhost:11434".
    /// * `model` - Model identifier for chat calls (e.g. "phi3:3.8b").
    /// * `timeout` - Per-request deadline owned by this client.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for Ollama")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            timeout,
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl GenerativeBackend for OllamaClient {
    async fn generate(
        &self,
        system_instruction: &str,
        messages: &[ChatMessage],
        options: SamplingOptions,
    ) -> Result<String, BackendError> {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(OllamaWireMessage {
            role: "system",
            content: system_instruction,
        });
        for message in messages {
            wire_messages.push(OllamaWireMessage {
                role: message.role.as_wire_str(),
                content: &message.content,
            });
        }

        let request = OllamaChatRequest {
            model: &self.model,
            messages: wire_messages,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    BackendError::Unreachable(format!("connection failed: {e}"))
                } else {
                    BackendError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(parsed.message.content.trim().to_string())
    }
}
