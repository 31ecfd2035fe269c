use anyhow::{Result, bail};

use crate::config::Settings;
use crate::llm::{ChatMessage, LlmClient, prompt_builder};

/// Generate a commit message for `diff`: seed prompt, optional context, then
/// the diff itself, in that order, through one chat round trip.
///
/// A blank reply means the vendor produced no usable completion, which is an
/// operation failure here rather than inside the client.
pub fn generate_commit_message(
    client: &dyn LlmClient,
    settings: &Settings,
    diff: &str,
    additional_context: Option<&str>,
) -> Result<String> {
    let messages = build_messages(settings, diff, additional_context)?;
    let reply = client.chat(&messages)?;

    if reply.trim().is_empty() {
        bail!("failed to generate a commit message: the model returned no text");
    }

    Ok(reply)
}

fn build_messages(
    settings: &Settings,
    diff: &str,
    additional_context: Option<&str>,
) -> Result<Vec<ChatMessage>> {
    let mut messages = prompt_builder::seed_messages(settings)?;

    if let Some(context) = additional_context.map(str::trim).filter(|c| !c.is_empty()) {
        messages.push(ChatMessage::user(format!(
            "Additional context for the changes:\n{context}"
        )));
    }

    messages.push(ChatMessage::user(diff));
    Ok(messages)
}
