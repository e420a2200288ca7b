//! # vigil-cli
//!
//! Command-line interface for Vigil.
//!
//! The `hook` subcommand is the integration point for host agents: it reads
//! one JSON request from stdin, evaluates it against the policy document,
//! prints a decision as JSON on stdout, and exits 0 (continue) or 2 (halt).
//! The remaining subcommands administer the policy:
//! - `vigil policy init/show/set-profile` — manage the policy document
//! - `vigil lock` / `vigil unlock` — engage or release the panic lock
//! - `vigil classify` — score a prompt without gating anything
//! - `vigil plan show` — display the resolved plan file and scope

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Vigil CLI — policy gates for coding agents.
#[derive(Parser)]
#[command(name = "vigil", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one hook request read as JSON from stdin.
    Hook,
    /// Manage the policy document.
    Policy {
        #[command(subcommand)]
        command: commands::policy::PolicyCommands,
    },
    /// Engage the panic lock: every gate refuses until unlocked.
    Lock,
    /// Release the panic lock back to the standard profile.
    Unlock,
    /// Classify a prompt's intent without gating anything.
    Classify {
        /// The natural-language prompt to score.
        prompt: String,
    },
    /// View the resolved plan file.
    Plan {
        #[command(subcommand)]
        command: commands::plan::PlanCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interfere with decision JSON on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);

    match &cli.command {
        Commands::Hook => commands::hook::execute(&project_root),
        Commands::Policy { command } => commands::policy::execute(command, &project_root),
        Commands::Lock => commands::policy::lock(&project_root),
        Commands::Unlock => commands::policy::unlock(&project_root),
        Commands::Classify { prompt } => commands::classify::execute(prompt, &project_root),
        Commands::Plan { command } => commands::plan::execute(command, &project_root),
    }
}
