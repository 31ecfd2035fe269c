use anyhow::Result;
use log::debug;

use crate::llm::azure::AzureOpenAiClient;
use crate::llm::gemini::GeminiClient;
use crate::llm::ollama::OllamaClient;
use crate::llm::openai::OpenAiCompatClient;
use crate::llm::{LlmClient, NoopClient};
use crate::provider::ProviderConfig;

/// Build the chat client for a validated provider. Pure dispatch: no network
/// I/O happens until `chat` is invoked.
pub fn build_llm_client(conf: ProviderConfig) -> Result<Box<dyn LlmClient>> {
    debug!(
        "Using provider '{}' (model {})",
        conf.common().label(),
        conf.common().model
    );

    Ok(match conf {
        ProviderConfig::OpenAiCompatible(p) => Box::new(OpenAiCompatClient::new(p)?),
        ProviderConfig::AzureOpenAi(p) => Box::new(AzureOpenAiClient::new(p)?),
        ProviderConfig::Gemini(p) => Box::new(GeminiClient::new(p)?),
        ProviderConfig::Ollama(p) => Box::new(OllamaClient::new(p)?),
    })
}

/// Client for `--no-model` runs: no provider needed, no network calls made.
pub fn build_noop_client() -> Box<dyn LlmClient> {
    debug!("Using NoopClient (no model calls)");
    Box::new(NoopClient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderEntry, validate};

    fn validated(doc: &str) -> ProviderConfig {
        let entry: ProviderEntry = toml::from_str(doc).unwrap();
        validate(&entry).unwrap()
    }

    #[test]
    fn factory_covers_every_vendor_kind() {
        let configs = [
            validated(
                r#"
                id = "oa"
                type = "openai"
                model = "gpt-4o-mini"
                baseUrl = "https://api.openai.com/v1"
                apiKey = "k"
                "#,
            ),
            validated(
                r#"
                id = "az"
                type = "azure-openai"
                model = "gpt-4"
                endpoint = "https://corp.openai.azure.com"
                apiKey = "k"
                apiVersion = "2024-06-01"
                deployment = "prod"
                "#,
            ),
            validated(
                r#"
                id = "g"
                type = "gemini"
                model = "gemini-1.5-flash"
                apiKey = "k"
                "#,
            ),
            validated(
                r#"
                id = "local"
                type = "ollama"
                model = "llama3"
                "#,
            ),
        ];

        for conf in configs {
            // Construction must succeed and perform no I/O.
            build_llm_client(conf).unwrap();
        }
    }
}
