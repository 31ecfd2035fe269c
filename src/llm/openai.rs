use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, LlmClient, apply_headers, http_client, truncate};
use crate::provider::{GenerationParams, OpenAiCompatibleProvider};

/// Minimal request/response structs for the Chat Completions wire dialect.
/// The Azure client reuses these; the two differ only in routing and auth.
#[derive(Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    /// Resolve effective sampling parameters: temperature falls back to the
    /// default, `top_p`/`max_tokens` are serialized only when the operator
    /// set them.
    pub(crate) fn new(
        model: &'a str,
        params: &GenerationParams,
        messages: &'a [ChatMessage],
    ) -> Self {
        ChatRequest {
            model,
            messages,
            temperature: params.temperature_or_default(),
            top_p: params.top_p,
            max_tokens: params.max_tokens,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub(crate) struct ChatMessageResponse {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl ChatResponse {
    /// First completion's text, empty when the vendor returned none.
    pub(crate) fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}

/// Client for the OpenAI-compatible family (`openai`, `openai-compatible`,
/// `openrouter`): bearer-token auth against `{baseUrl}/chat/completions`.
pub struct OpenAiCompatClient {
    client: Client,
    conf: OpenAiCompatibleProvider,
}

impl OpenAiCompatClient {
    pub fn new(conf: OpenAiCompatibleProvider) -> Result<Self> {
        let client = http_client(conf.common.timeout_ms)?;
        Ok(OpenAiCompatClient { client, conf })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.conf.base_url.trim_end_matches('/'))
    }
}

impl LlmClient for OpenAiCompatClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.chat_url();
        let body = ChatRequest::new(&self.conf.common.model, &self.conf.common.params, messages);

        log::info!("Calling model {:?} at {url}", self.conf.common.model);
        log::trace!(
            "Request body: {}",
            truncate(&serde_json::to_string(&body).unwrap_or_default(), 2000)
        );

        let mut req = self
            .client
            .post(&url)
            .bearer_auth(&self.conf.api_key)
            .json(&body);
        if let Some(org) = &self.conf.organization {
            req = req.header("OpenAI-Organization", org);
        }
        req = apply_headers(req, &self.conf.common.headers);

        let resp = req
            .send()
            .with_context(|| format!("failed to send request to {url}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "API error from provider '{}': HTTP {} - {}",
                self.conf.common.id,
                status.as_u16(),
                text
            ));
        }

        let chat_resp: ChatResponse = resp
            .json()
            .context("failed to parse chat completion response")?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(chat_resp.into_text())
    }
}
