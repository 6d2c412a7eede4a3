//! Iris CLI - send an image and a prompt to a hosted vision model.
//!
//! # Usage
//!
//! ```bash
//! # Analyse ./2.png with the default prompt
//! export GEMINI_API_KEY=...
//! iris analyze
//!
//! # Custom image, prompt and model, full JSON record
//! iris analyze kitchen.jpg -p "Is this kitchen clean?" -m gemini-2.5-flash --format json
//!
//! # View configuration
//! iris config show
//! ```

use clap::{Parser, Subcommand};
use iris_core::{AnalyzeError, Config, ConfigError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod cli;
mod logging;

/// Iris - send an image and a prompt to a hosted vision model and print the reply.
#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "IRIS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one image to the model and print its reply
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Load config from an explicit path, or the default location.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Exit code for a failed command: analysis failures map by kind,
/// configuration problems exit with 2, anything else with 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(e) = err.downcast_ref::<AnalyzeError>() {
        e.kind().exit_code()
    } else if err.downcast_ref::<ConfigError>().is_some() {
        2
    } else {
        1
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A broken config is reported once, by the command that needs it.
    let loaded = load_config(cli.config.as_deref());
    match &loaded {
        Ok(config) => logging::init_from_config(config, cli.verbose, cli.json_logs),
        Err(_) => logging::init_from_config(&Config::default(), cli.verbose, cli.json_logs),
    }

    tracing::debug!("Iris v{}", iris_core::VERSION);

    let result = match cli.command {
        Commands::Analyze(args) => cli::analyze::execute(args, loaded).await,
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref(), loaded).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = exit_code(&e);
            match e.downcast_ref::<AnalyzeError>() {
                Some(analyze_err) => {
                    tracing::debug!(kind = %analyze_err.kind(), "Analysis failed");
                    eprintln!("Error [{}]: {e}", analyze_err.kind());
                }
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::from(code)
        }
    }
}
