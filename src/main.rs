use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use indicatif::ProgressBar;

mod cli_args;
mod config;
mod expand;
mod generate;
mod git;
mod llm;
mod logging;
mod provider;
mod setup;

use cli_args::{Cli, Command};
use config::Settings;
use llm::LlmClient;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let config_path = config::config_path(cli.config.as_deref())?;

    match &cli.command {
        Some(Command::Providers) => {
            let settings = Settings::load(&config_path)?;
            run_list_providers(&settings);
            Ok(())
        }
        Some(Command::Use { id }) => config::set_active_provider_id(&config_path, id),
        None => {
            let mut settings = Settings::load(&config_path)?;
            apply_overrides(&mut settings, &cli);
            run_generate(&cli, &settings)
        }
    }
}

/// CLI flags win over the config file for prompt-shaping settings.
fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if cli.language.is_some() {
        settings.commit_language = cli.language.clone();
    }
    if cli.flavor.is_some() {
        settings.prompt_flavor = cli.flavor.clone();
    }
    if let Some(path) = &cli.prompt_file {
        settings.prompt_file = Some(path.to_string_lossy().into_owned());
    }
}

fn run_list_providers(settings: &Settings) {
    if settings.providers.is_empty() {
        println!("No providers configured.");
        return;
    }

    let active_id = settings
        .active_provider_id
        .as_deref()
        .filter(|id| settings.providers.iter().any(|p| p.id == *id))
        .unwrap_or(&settings.providers[0].id);

    for entry in &settings.providers {
        let marker = if entry.id == active_id { "*" } else { " " };
        let model = entry.model.as_deref().unwrap_or("-");
        match &entry.display_name {
            Some(name) => println!("{marker} {id} ({name}) [{kind}] model={model}",
                id = entry.id, kind = entry.kind),
            None => println!("{marker} {id} [{kind}] model={model}", id = entry.id, kind = entry.kind),
        }
    }
}

fn build_client(cli: &Cli, settings: &Settings) -> Result<Box<dyn LlmClient>> {
    if cli.no_model {
        return Ok(setup::build_noop_client());
    }

    let conf = match &cli.provider {
        Some(id) => settings.provider_by_id(id)?,
        None => settings.active_provider()?,
    };
    setup::build_llm_client(conf)
}

fn run_generate(cli: &Cli, settings: &Settings) -> Result<()> {
    if cli.stage_all {
        git::stage_all()?;
    }

    let diff = git::staged_diff()?;
    if diff.trim().is_empty() {
        println!("No staged changes found.");
        return Ok(());
    }

    let client = build_client(cli, settings)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Generating commit message...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result =
        generate::generate_commit_message(client.as_ref(), settings, &diff, cli.context.as_deref());
    spinner.finish_and_clear();
    let commit_message = result?;

    println!();
    println!("----- Commit Message Preview -----");
    println!("{commit_message}");
    println!("----------------------------------");

    if cli.apply {
        git::write_commit_editmsg(&commit_message)?;
        println!("Wrote message to .git/COMMIT_EDITMSG");
    }

    Ok(())
}
