use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Default sampling temperature when the provider entry sets none.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Ollama listens on the local loopback unless told otherwise.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Configuration errors surfaced before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no LLM providers configured")]
    NoProviders,

    #[error("provider '{id}': missing {}", .fields.join(", "))]
    MissingFields { id: String, fields: Vec<&'static str> },

    #[error("provider '{id}': unknown type '{kind}'")]
    UnknownProviderType { id: String, kind: String },

    #[error("no provider with id '{id}' is configured")]
    UnknownProviderId { id: String },
}

/// Optional per-request sampling overrides. `top_p` and `maxTokens` are only
/// forwarded to a vendor when the operator set them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    #[serde(rename = "maxTokens")]
    pub max_tokens: Option<u32>,
}

impl GenerationParams {
    pub fn temperature_or_default(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// One provider definition exactly as it sits in the settings file, after
/// environment-placeholder expansion. Vendor fields are all optional here;
/// `validate` decides which ones the declared type actually requires.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub model: Option<String>,
    pub display_name: Option<String>,
    pub timeout_ms: Option<u64>,
    pub headers: BTreeMap<String, String>,
    pub params: GenerationParams,

    // OpenAI-compatible family
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub organization: Option<String>,

    // Azure
    pub endpoint: Option<String>,
    pub api_version: Option<String>,
    pub deployment: Option<String>,
}

/// Fields shared by every vendor kind, present only after validation.
#[derive(Debug, Clone)]
pub struct ProviderCommon {
    pub id: String,
    pub model: String,
    pub display_name: Option<String>,
    pub timeout_ms: Option<u64>,
    pub headers: BTreeMap<String, String>,
    pub params: GenerationParams,
}

impl ProviderCommon {
    /// Human-facing name: `displayName` when set, the id otherwise.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    pub common: ProviderCommon,
    pub base_url: String,
    pub api_key: String,
    pub organization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AzureOpenAiProvider {
    pub common: ProviderCommon,
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub deployment: String,
}

#[derive(Debug, Clone)]
pub struct GeminiProvider {
    pub common: ProviderCommon,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    pub common: ProviderCommon,
    pub base_url: String,
}

/// A validated provider definition. One variant per wire dialect; a kind the
/// validator does not recognize never gets this far, so the client factory
/// can match exhaustively.
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    OpenAiCompatible(OpenAiCompatibleProvider),
    AzureOpenAi(AzureOpenAiProvider),
    Gemini(GeminiProvider),
    Ollama(OllamaProvider),
}

impl ProviderConfig {
    pub fn common(&self) -> &ProviderCommon {
        match self {
            ProviderConfig::OpenAiCompatible(p) => &p.common,
            ProviderConfig::AzureOpenAi(p) => &p.common,
            ProviderConfig::Gemini(p) => &p.common,
            ProviderConfig::Ollama(p) => &p.common,
        }
    }
}

/// Check the required-field table for the entry's declared type and convert
/// it into a typed [`ProviderConfig`]. Every missing field is reported at
/// once, not just the first; an empty string counts as missing.
pub fn validate(entry: &ProviderEntry) -> Result<ProviderConfig, ConfigError> {
    match entry.kind.as_str() {
        "openai" | "openai-compatible" | "openrouter" => {
            let mut missing = Vec::new();
            let base_url = require(&mut missing, "baseUrl", &entry.base_url);
            let api_key = require(&mut missing, "apiKey", &entry.api_key);
            let common = common_fields(&mut missing, entry);
            fail_if_missing(entry, missing)?;

            Ok(ProviderConfig::OpenAiCompatible(OpenAiCompatibleProvider {
                common,
                base_url,
                api_key,
                organization: non_empty(&entry.organization),
            }))
        }
        "azure-openai" => {
            let mut missing = Vec::new();
            let endpoint = require(&mut missing, "endpoint", &entry.endpoint);
            let api_key = require(&mut missing, "apiKey", &entry.api_key);
            let api_version = require(&mut missing, "apiVersion", &entry.api_version);
            let deployment = require(&mut missing, "deployment", &entry.deployment);
            let common = common_fields(&mut missing, entry);
            fail_if_missing(entry, missing)?;

            Ok(ProviderConfig::AzureOpenAi(AzureOpenAiProvider {
                common,
                endpoint,
                api_key,
                api_version,
                deployment,
            }))
        }
        "gemini" => {
            let mut missing = Vec::new();
            let api_key = require(&mut missing, "apiKey", &entry.api_key);
            let common = common_fields(&mut missing, entry);
            fail_if_missing(entry, missing)?;

            Ok(ProviderConfig::Gemini(GeminiProvider { common, api_key }))
        }
        "ollama" => {
            let mut missing = Vec::new();
            let common = common_fields(&mut missing, entry);
            fail_if_missing(entry, missing)?;

            let base_url = non_empty(&entry.base_url)
                .unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_string());
            Ok(ProviderConfig::Ollama(OllamaProvider { common, base_url }))
        }
        other => Err(ConfigError::UnknownProviderType {
            id: entry.id.clone(),
            kind: other.to_string(),
        }),
    }
}

/// Pull the common fields out of an entry; `model` is required for every
/// vendor kind.
fn common_fields(missing: &mut Vec<&'static str>, entry: &ProviderEntry) -> ProviderCommon {
    let model = require(missing, "model", &entry.model);
    ProviderCommon {
        id: entry.id.clone(),
        model,
        display_name: non_empty(&entry.display_name),
        timeout_ms: entry.timeout_ms,
        headers: entry.headers.clone(),
        params: entry.params,
    }
}

/// Record `name` as missing when the value is absent or empty; returns the
/// value (or a placeholder empty string that is never used, since recording a
/// missing field fails validation before construction completes).
fn require(missing: &mut Vec<&'static str>, name: &'static str, value: &Option<String>) -> String {
    match non_empty(value) {
        Some(v) => v,
        None => {
            missing.push(name);
            String::new()
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(String::from)
}

fn fail_if_missing(entry: &ProviderEntry, missing: Vec<&'static str>) -> Result<(), ConfigError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingFields {
            id: entry.id.clone(),
            fields: missing,
        })
    }
}
