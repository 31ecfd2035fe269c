pub mod azure;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod prompt_builder;
pub mod prompts;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;

/// Conversation role tags, serialized lowercase on every wire dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn. Order within a message list is the conversation
/// order and is preserved verbatim into each vendor's request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Trait for talking to an LLM: one request/response round trip per call.
///
/// Implementations return the assistant's text, or an empty string when the
/// vendor produced no usable completion; transport and HTTP failures
/// propagate as errors untouched.
pub trait LlmClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// No-op client for `--no-model`: no network, canned output.
pub struct NoopClient;

impl LlmClient for NoopClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(format!(
            "Dummy commit message for testing\n\n(LLM disabled; {} prompt message(s) supplied)",
            messages.len()
        ))
    }
}

/// Build the blocking HTTP client shared by every dialect, honoring the
/// provider's request timeout when one is configured.
pub(crate) fn http_client(timeout_ms: Option<u64>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(ms) = timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    builder.build().context("failed to build HTTP client")
}

/// Attach operator-configured headers to an outgoing request.
pub(crate) fn apply_headers(
    mut req: RequestBuilder,
    headers: &BTreeMap<String, String>,
) -> RequestBuilder {
    for (name, value) in headers {
        req = req.header(name.as_str(), value.as_str());
    }
    req
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...\n[truncated {} chars]", &s[..max_len], s.len() - max_len)
    }
}
