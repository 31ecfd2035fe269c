use anyhow::{Result, anyhow};
use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;

use super::{ChatMessage, LlmClient, apply_headers, http_client};
use crate::provider::OllamaProvider;

// Request/response structs we encode with musli::json.
#[derive(Debug, Encode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Encode)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
}

#[derive(Debug, Encode)]
struct OllamaOptions {
    temperature: f64,
    #[musli(skip_encoding_if = Option::is_none)]
    top_p: Option<f64>,
    #[musli(skip_encoding_if = Option::is_none)]
    num_predict: Option<u32>,
}

#[derive(Debug, Decode)]
struct OllamaResponseMessage {
    #[musli(default)]
    content: Option<String>,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    #[musli(default)]
    message: Option<OllamaResponseMessage>,
}

/// Synchronous Ollama client using /api/chat.
pub struct OllamaClient {
    http: Client,
    conf: OllamaProvider,
}

impl OllamaClient {
    pub fn new(conf: OllamaProvider) -> Result<Self> {
        let http = http_client(conf.common.timeout_ms)?;
        Ok(OllamaClient { http, conf })
    }

    fn build_request(&self, messages: &[ChatMessage]) -> OllamaChatRequest {
        let params = &self.conf.common.params;
        OllamaChatRequest {
            model: self.conf.common.model.clone(),
            stream: false,
            messages: messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            options: OllamaOptions {
                temperature: params.temperature_or_default(),
                top_p: params.top_p,
                num_predict: params.max_tokens,
            },
        }
    }
}

impl LlmClient for OllamaClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let req_body = self.build_request(messages);
        let body_str = json::to_string(&req_body)
            .map_err(|e| anyhow!("Failed to encode Ollama JSON request: {e}"))?;

        log::trace!("Ollama request body: {body_str}");

        let url = format!("{}/api/chat", self.conf.base_url.trim_end_matches('/'));

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str);
        let resp = apply_headers(resp, &self.conf.common.headers)
            .send()
            .map_err(|e| anyhow!("Error calling Ollama at {url}: {e}"))?
            .error_for_status()
            .map_err(|e| anyhow!("Ollama HTTP error from {url}: {e}"))?;

        let resp_text = resp
            .text()
            .map_err(|e| anyhow!("Failed to read Ollama response body: {e}"))?;

        log::trace!("Ollama raw JSON response: {resp_text}");

        let parsed: OllamaChatResponse =
            json::from_str(&resp_text).map_err(|e| anyhow!("Failed to decode Ollama JSON: {e}"))?;

        Ok(parsed
            .message
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GenerationParams, ProviderCommon};

    fn conf(params: GenerationParams) -> OllamaProvider {
        OllamaProvider {
            common: ProviderCommon {
                id: "local".into(),
                model: "llama3".into(),
                display_name: None,
                timeout_ms: None,
                headers: Default::default(),
                params,
            },
            base_url: "http://127.0.0.1:11434".into(),
        }
    }

    #[test]
    fn request_disables_streaming_and_omits_unset_options() {
        let client = OllamaClient::new(conf(GenerationParams::default())).unwrap();
        let req = client.build_request(&[ChatMessage::user("diff")]);
        let encoded = json::to_string(&req).unwrap();

        assert!(encoded.contains("\"stream\":false"));
        assert!(encoded.contains("\"temperature\""));
        assert!(!encoded.contains("top_p"));
        assert!(!encoded.contains("num_predict"));
    }

    #[test]
    fn explicit_options_are_encoded() {
        let params = GenerationParams {
            temperature: Some(0.3),
            top_p: Some(0.95),
            max_tokens: Some(128),
        };
        let client = OllamaClient::new(conf(params)).unwrap();
        let encoded = json::to_string(&client.build_request(&[])).unwrap();

        assert!(encoded.contains("\"top_p\""));
        assert!(encoded.contains("\"num_predict\":128"));
    }

    #[test]
    fn response_without_message_decodes_to_empty() {
        let parsed: OllamaChatResponse = json::from_str(r#"{"done":true}"#).unwrap();
        assert!(parsed.message.and_then(|m| m.content).is_none());
    }
}
