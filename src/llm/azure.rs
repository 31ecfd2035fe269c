use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;

use super::openai::{ChatRequest, ChatResponse};
use super::{ChatMessage, LlmClient, apply_headers, http_client};
use crate::provider::AzureOpenAiProvider;

/// Client for Azure-hosted OpenAI deployments. Same body as the
/// OpenAI-compatible dialect, but the request is routed through the
/// deployment path, versioned with an `api-version` query parameter, and
/// authenticated with the `api-key` header instead of a bearer token.
pub struct AzureOpenAiClient {
    client: Client,
    conf: AzureOpenAiProvider,
}

impl AzureOpenAiClient {
    pub fn new(conf: AzureOpenAiProvider) -> Result<Self> {
        let client = http_client(conf.common.timeout_ms)?;
        Ok(AzureOpenAiClient { client, conf })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.conf.endpoint.trim_end_matches('/'),
            self.conf.deployment
        )
    }
}

impl LlmClient for AzureOpenAiClient {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = self.chat_url();
        let body = ChatRequest::new(&self.conf.common.model, &self.conf.common.params, messages);

        log::info!(
            "Calling Azure deployment {:?} (api-version {})",
            self.conf.deployment,
            self.conf.api_version
        );

        let mut req = self
            .client
            .post(&url)
            .query(&[("api-version", self.conf.api_version.as_str())])
            .header("api-key", &self.conf.api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{GenerationParams, ProviderCommon};

    fn client(endpoint: &str) -> AzureOpenAiClient {
        AzureOpenAiClient::new(AzureOpenAiProvider {
            common: ProviderCommon {
                id: "az".into(),
                model: "gpt-4".into(),
                display_name: None,
                timeout_ms: None,
                headers: Default::default(),
                params: GenerationParams::default(),
            },
            endpoint: endpoint.into(),
            api_key: "k".into(),
            api_version: "2024-06-01".into(),
            deployment: "prod-gpt4".into(),
        })
        .unwrap()
    }

    #[test]
    fn url_composes_endpoint_and_deployment() {
        assert_eq!(
            client("https://corp.openai.azure.com").chat_url(),
            "https://corp.openai.azure.com/openai/deployments/prod-gpt4/chat/completions"
        );
    }

    #[test]
    fn trailing_slash_on_endpoint_is_normalized() {
        assert_eq!(
            client("https://corp.openai.azure.com/").chat_url(),
            "https://corp.openai.azure.com/openai/deployments/prod-gpt4/chat/completions"
        );
    }
}
