use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use toml::Value;

use crate::expand;
use crate::provider::{self, ConfigError, ProviderConfig, ProviderEntry};

/// The persisted settings surface. Key spellings follow the config file
/// (`activeProviderId`, `promptFlavor`, ...), which is what validation errors
/// quote back at the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub providers: Vec<ProviderEntry>,
    pub active_provider_id: Option<String>,
    pub prompt_flavor: Option<String>,
    pub prompt_file: Option<String>,
    pub commit_language: Option<String>,
}

impl Settings {
    /// Read settings from `path` (or the default location). A missing file is
    /// an empty configuration, not an error; a file that fails to parse is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Settings::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let value: Value = toml::from_str(&data)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        Self::from_value(&value)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Build settings from an already-parsed TOML document, applying
    /// environment-placeholder expansion first. This is the seam tests use to
    /// exercise resolution without a real file.
    pub fn from_value(value: &Value) -> Result<Self> {
        expand::expand_value(value)
            .try_into()
            .context("failed to deserialize settings")
    }

    /// Resolve the active provider per the registry policy: the entry whose
    /// id equals `activeProviderId` when present, else the first entry. Zero
    /// providers is a configuration error. The chosen entry is validated
    /// before being returned.
    pub fn active_provider(&self) -> Result<ProviderConfig, ConfigError> {
        let first = self.providers.first().ok_or(ConfigError::NoProviders)?;
        let chosen = self
            .active_provider_id
            .as_deref()
            .and_then(|id| self.providers.iter().find(|p| p.id == id))
            .unwrap_or(first);
        provider::validate(chosen)
    }

    /// Resolve a provider by explicit id. Unlike the `activeProviderId`
    /// policy there is no fallback: naming an unknown id is an error.
    pub fn provider_by_id(&self, id: &str) -> Result<ProviderConfig, ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        let entry = self
            .providers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ConfigError::UnknownProviderId { id: id.to_string() })?;
        provider::validate(entry)
    }
}

/// Return the config file location: an explicit path wins, otherwise
/// `~/.config/aicommit.toml`.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(home.join(".config").join("aicommit.toml"))
}

/// Persist `activeProviderId` back into the config file, leaving every other
/// key in place. Fails when the file does not exist or does not define the
/// given provider id.
pub fn set_active_provider_id(path: &Path, id: &str) -> Result<()> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let mut value: Value = toml::from_str(&data)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;

    let known = value
        .get("providers")
        .and_then(Value::as_array)
        .is_some_and(|providers| {
            providers
                .iter()
                .any(|p| p.get("id").and_then(Value::as_str) == Some(id))
        });
    if !known {
        return Err(ConfigError::UnknownProviderId { id: id.to_string() }.into());
    }

    let table = value
        .as_table_mut()
        .ok_or_else(|| anyhow!("config file {} is not a TOML table", path.display()))?;
    table.insert("activeProviderId".to_string(), Value::String(id.to_string()));

    let rendered = toml::to_string_pretty(&value).context("failed to render config file")?;
    fs::write(path, rendered)
        .with_context(|| format!("failed to write config file {}", path.display()))?;

    log::info!("Active provider set to '{id}'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::OLLAMA_DEFAULT_BASE_URL;

    fn settings(doc: &str) -> Settings {
        let value: Value = toml::from_str(doc).unwrap();
        Settings::from_value(&value).unwrap()
    }

    #[test]
    fn active_id_selects_the_matching_entry() {
        let s = settings(
            r#"
            activeProviderId = "second"

            [[providers]]
            id = "first"
            type = "ollama"
            model = "llama3"

            [[providers]]
            id = "second"
            type = "ollama"
            model = "mistral"
            "#,
        );

        let conf = s.active_provider().unwrap();
        assert_eq!(conf.common().id, "second");
    }

    #[test]
    fn missing_or_unmatched_active_id_falls_back_to_first() {
        let s = settings(
            r#"
            [[providers]]
            id = "a"
            type = "ollama"
            model = "llama3"
            "#,
        );
        assert_eq!(s.active_provider().unwrap().common().id, "a");

        let s = settings(
            r#"
            activeProviderId = "nope"

            [[providers]]
            id = "a"
            type = "ollama"
            model = "llama3"
            "#,
        );
        assert_eq!(s.active_provider().unwrap().common().id, "a");
    }

    #[test]
    fn zero_providers_is_a_configuration_error() {
        let s = settings("");
        assert!(matches!(s.active_provider(), Err(ConfigError::NoProviders)));
    }

    #[test]
    fn default_ollama_scenario() {
        // providers = [{id:"a", type:"ollama", model:"llama3"}], no active id
        let s = settings(
            r#"
            [[providers]]
            id = "a"
            type = "ollama"
            model = "llama3"
            "#,
        );

        match s.active_provider().unwrap() {
            ProviderConfig::Ollama(p) => {
                assert_eq!(p.common.id, "a");
                assert_eq!(p.base_url, OLLAMA_DEFAULT_BASE_URL);
            }
            other => panic!("unexpected config: {other:?}"),
        }
    }

    #[test]
    fn env_expansion_resolves_before_validation() {
        unsafe { std::env::set_var("AICOMMIT_TEST_AZURE_KEY", "secret123") };

        let s = settings(
            r#"
            [[providers]]
            id = "b"
            type = "azure-openai"
            model = "gpt-4"
            apiKey = "${env:AICOMMIT_TEST_AZURE_KEY}"
            "#,
        );

        // apiKey resolved from the environment, so only the other three are
        // reported missing.
        let err = s.active_provider().unwrap_err();
        match err {
            ConfigError::MissingFields { id, fields } => {
                assert_eq!(id, "b");
                assert_eq!(fields, vec!["endpoint", "apiVersion", "deployment"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn provider_by_id_does_not_fall_back() {
        let s = settings(
            r#"
            [[providers]]
            id = "a"
            type = "ollama"
            model = "llama3"
            "#,
        );

        assert_eq!(s.provider_by_id("a").unwrap().common().id, "a");
        assert!(matches!(
            s.provider_by_id("missing"),
            Err(ConfigError::UnknownProviderId { .. })
        ));
    }

    #[test]
    fn provider_order_is_preserved() {
        let s = settings(
            r#"
            [[providers]]
            id = "one"
            type = "ollama"
            model = "m"

            [[providers]]
            id = "two"
            type = "gemini"
            model = "m"

            [[providers]]
            id = "three"
            type = "openai"
            model = "m"
            "#,
        );

        let ids: Vec<&str> = s.providers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["one", "two", "three"]);
    }
}
