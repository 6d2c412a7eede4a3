//! The `iris config` command for configuration management.

use clap::{Args, Subcommand};
use iris_core::llm::env_var_name;
use iris_core::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Resolve the config file location: `--config` if given, else the default.
fn config_file(config_path: Option<&Path>) -> PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}

/// Write the default config to `path`, refusing to clobber unless `force`.
fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = Config::default().to_toml()?;
    std::fs::write(path, toml)?;
    Ok(())
}

/// Copy of `config` safe to print. A literal API key is masked; a `${VAR}`
/// reference is kept as written.
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    let key = &mut config.llm.gemini.api_key;
    if !key.is_empty() && env_var_name(key).is_none() {
        *key = "<redacted>".to_string();
    }
    config
}

/// Execute the config command.
///
/// `loaded` is the result of reading the config file; only `show` needs it,
/// so a broken file does not stop `path` or `init`.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    loaded: Result<Config, ConfigError>,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let toml = redacted(&loaded?).to_toml()?;
            println!("{}", toml);
        }

        ConfigCommand::Path => {
            println!("{}", config_file(config_path).display());
        }

        ConfigCommand::Init { force } => {
            let path = config_file(config_path);
            init_config(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
