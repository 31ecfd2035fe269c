use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{ChatMessage, LlmClient, apply_headers, http_client};
use crate::provider::GeminiProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "topP", skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Collapse the role-tagged conversation into the single text blob the
/// simple-path generateContent call expects: one `role: content` line per
/// message, original order. Structured multi-turn is deliberately not used
/// for this vendor.
pub(crate) fn flatten_messages(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Client for Google's Gemini API (`models/{model}:generateContent`).
pub struct GeminiClient {
    client: Client,
    conf: GeminiProvider,
}

impl GeminiClient {
    pub fn new(conf: GeminiProvider) -> Result<Self> {
        let client = http_client(conf.common.timeout_ms)?;
        Ok(GeminiClient { client, conf })
    }
}

impl LlmClient for GeminiClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{API_BASE}/models/{}:generateContent", self.conf.common.model);
        let prompt = flatten_messages(messages);
        let params = &self.conf.common.params;
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature_or_default(),
                top_p: params.top_p,
                max_output_tokens: params.max_tokens,
            },
        };

        log::info!("Calling Gemini model {:?}", self.conf.common.model);

        let mut req = self
            .client
            .post(&url)
            .query(&[("key", self.conf.api_key.as_str())])
            .json(&body);
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

        let parsed: GenerateResponse = resp.json().context("failed to parse Gemini response")?;
        Ok(parsed.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattening_keeps_order_and_role_tags() {
        let messages = vec![
            ChatMessage::system("rules"),
            ChatMessage::user("context"),
            ChatMessage::user("diff"),
        ];
        assert_eq!(
            flatten_messages(&messages),
            "system: rules\nuser: context\nuser: diff"
        );
    }

    #[test]
    fn flattening_an_empty_list_is_empty() {
        assert_eq!(flatten_messages(&[]), "");
    }

    #[test]
    fn response_text_concatenates_first_candidate_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "fix: "}, {"text": "thing"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.into_text(), "fix: thing");
    }

    #[test]
    fn missing_candidates_yield_empty_text() {
        let resp: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(resp.into_text(), "");

        let resp: GenerateResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(resp.into_text(), "");
    }
}
