//! Chat API client.
//!
//! One non-streaming request/response exchange per send. The panel runs
//! [`ChatBackend::send_message`] on a worker thread, so the shipped backend
//! uses the blocking `reqwest` client.

use crate::model::{Message, Role, TokenUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Messages API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upper bound on a single exchange.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from a single exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No API key was configured.
    #[error("No API key configured (set CHATLIST_API_KEY or api_key in the config file)")]
    MissingApiKey,

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the raw body.
        message: String,
    },

    /// The response body was not a Messages API reply.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Per-send parameters besides the new user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOptions {
    /// Prior conversation in order. Non-conversational roles are dropped.
    pub history: Vec<Message>,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Reply token limit.
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves the API default.
    pub temperature: Option<f64>,
    /// Messages endpoint URL.
    pub api_url: String,
}

/// Text and usage of one assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Concatenated text blocks.
    pub text: String,
    /// Usage statistics if reported.
    pub usage: Option<TokenUsage>,
}

/// Anything that can answer a user turn.
pub trait ChatBackend: Send + Sync {
    /// Send `content` as the next user turn and wait for the reply.
    ///
    /// # Errors
    /// See [`ClientError`].
    fn send_message(
        &self,
        content: &str,
        model: &str,
        api_key: &str,
        options: &SendOptions,
    ) -> Result<AssistantReply, ClientError>;
}

// ===== Wire format =====

#[derive(Debug, Serialize, PartialEq)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn wire_role(role: Role) -> Option<&'static str> {
    match role {
        Role::User => Some("user"),
        Role::Assistant => Some("assistant"),
        Role::System | Role::Error => None,
    }
}

fn build_request<'a>(
    content: &'a str,
    model: &'a str,
    options: &'a SendOptions,
) -> MessagesRequest<'a> {
    let mut messages: Vec<WireMessage<'a>> = options
        .history
        .iter()
        .filter_map(|m| {
            wire_role(m.role()).map(|role| WireMessage {
                role,
                content: m.content(),
            })
        })
        .collect();
    messages.push(WireMessage {
        role: "user",
        content,
    });

    MessagesRequest {
        model,
        max_tokens: options.max_tokens,
        temperature: options.temperature,
        system: options
            .system_prompt
            .as_deref()
            .filter(|s| !s.trim().is_empty()),
        messages,
    }
}

fn parse_reply(body: &str) -> Result<AssistantReply, ClientError> {
    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))?;

    let text = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(AssistantReply {
        text,
        usage: response.usage,
    })
}

fn status_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ClientError::Status { status, message }
}

// ===== AnthropicClient =====

/// Messages API backend.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::blocking::Client,
}

impl AnthropicClient {
    /// Client with the default request timeout.
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }
}

impl ChatBackend for AnthropicClient {
    fn send_message(
        &self,
        content: &str,
        model: &str,
        api_key: &str,
        options: &SendOptions,
    ) -> Result<AssistantReply, ClientError> {
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let request = build_request(content, model, options);
        debug!(
            "Sending {} messages to {} with model {}",
            request.messages.len(),
            options.api_url,
            model
        );

        let response = self
            .http
            .post(&options.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            warn!("Chat API returned {}", status);
            return Err(status_error(status.as_u16(), &body));
        }

        parse_reply(&body)
    }
}
