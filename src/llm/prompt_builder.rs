use std::fs;

use anyhow::Result;

use super::ChatMessage;
use super::prompts;
use crate::config::Settings;
use crate::expand;

const DEFAULT_LANGUAGE: &str = "English";

/// Build the seed messages for a generation request: a single system message
/// holding the prompt template with the target language substituted in.
///
/// An external `promptFile` overrides the flavor template; if it cannot be
/// read we warn and fall back rather than abort a generation over a prompt
/// customization.
pub fn seed_messages(settings: &Settings) -> Result<Vec<ChatMessage>> {
    let template = external_template(settings).unwrap_or_else(|| {
        let flavor = settings.prompt_flavor.as_deref().unwrap_or_default();
        prompts::flavor_template(flavor).to_string()
    });

    let language = settings
        .commit_language
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    let mut system = template.replace("{{LANG}}", language);
    system.push_str(&format!(
        "\n\nRemember: All output MUST be in {language} language. \
         Your response must contain NOTHING but the commit message itself."
    ));

    Ok(vec![ChatMessage::system(system)])
}

fn external_template(settings: &Settings) -> Option<String> {
    let file = settings.prompt_file.as_deref()?.trim();
    if file.is_empty() {
        return None;
    }

    let path = expand::expand_path(file);
    match fs::read_to_string(&path) {
        Ok(contents) => Some(contents),
        Err(err) => {
            log::warn!(
                "Could not read prompt file {}: {err}; falling back to the built-in prompt",
                path.display()
            );
            None
        }
    }
}
