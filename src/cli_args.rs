use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, Subcommand};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "aicommit",
    version,
    about = "Generate Git commit messages from your staged diff with an LLM"
)]
#[command(group(
    ArgGroup::new("client_group")
        .args(["provider", "no_model"])
        .multiple(false)
))]
pub struct Cli {
    /// If set, write the generated message into .git/COMMIT_EDITMSG (no commit is created)
    #[arg(long, global = true)]
    pub apply: bool,

    /// Stage all changes (git add -A) before reading the diff
    #[arg(short = 'a', long)]
    pub stage_all: bool,

    /// Provider id to use for this run instead of the configured activeProviderId
    #[arg(long)]
    pub provider: Option<String>,

    /// Disable model calls; return a dummy message instead
    #[arg(long)]
    pub no_model: bool,

    /// Additional context passed to the model alongside the diff
    #[arg(short = 'c', long)]
    pub context: Option<String>,

    /// Target language for the generated message (overrides commitLanguage)
    #[arg(long)]
    pub language: Option<String>,

    /// Prompt flavor, e.g. "Conventional Commits with Gitmoji" (overrides promptFlavor)
    #[arg(long)]
    pub flavor: Option<String>,

    /// Path to a custom system prompt file (overrides promptFile)
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    /// Path to the configuration file (default: ~/.config/aicommit.toml)
    #[arg(long, env = "AICOMMIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity: -v info, -vv debug, -vvv trace
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand (e.g. 'providers')
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `aicommit providers`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured providers; the active one is marked with '*'
    Providers,

    /// Set the active provider id in the configuration file
    Use {
        /// Provider id as declared in the config file
        id: String,
    },
}
