//! The `carlot config` command for configuration management.

use clap::{Args, Subcommand};
use carlot_core::Config;
use std::path::Path;

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

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", render(&config)?);
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            // Ensure parent directory exists
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            write_default(&path)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Config as TOML, with the API key masked unless it is an env reference.
fn render(config: &Config) -> anyhow::Result<String> {
    let mut shown = config.clone();
    let key = &shown.classifier.api_key;
    if !key.is_empty() && !key.starts_with("${") {
        shown.classifier.api_key = "********".to_string();
    }
    Ok(shown.to_toml()?)
}

fn write_default(path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
