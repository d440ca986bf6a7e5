//! Carlot CLI - Sharpness and vehicle checks for car listing photos.
//!
//! Carlot decides whether an uploaded photo is good enough for a listing:
//! it must be sharp and large enough, and a classifier must see a car in it.
//!
//! # Usage
//!
//! ```bash
//! # Check photos and print one JSON report per file
//! carlot check front.jpg side.jpg rear.jpg
//!
//! # Local sharpness check only (no classifier call, no API key needed)
//! carlot check ./photos/*.jpg --sharpness-only
//!
//! # Validate and store a listing's photos (all or nothing)
//! carlot ingest front.jpg side.jpg --image-dir ./images
//!
//! # View configuration
//! carlot config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Carlot - Sharpness and vehicle checks for car listing photos.
#[derive(Parser, Debug)]
#[command(name = "carlot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check photos and report a verdict per file
    Check(cli::check::CheckArgs),

    /// Validate a set of listing photos and store them if all pass
    Ingest(cli::ingest::IngestArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match carlot_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `carlot config path`."
            );
            carlot_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Carlot v{}", carlot_core::VERSION);

    match cli.command {
        Commands::Check(args) => cli::check::execute(args).await,
        Commands::Ingest(args) => cli::ingest::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::try_parse_from([
            "carlot",
            "-v",
            "check",
            "a.jpg",
            "b.png",
            "--parallel",
            "2",
            "--sharpness-only",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.parallel, 2);
                assert!(args.sharpness_only);
            }
            other => panic!("Expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_check_requires_files() {
        assert!(Cli::try_parse_from(["carlot", "check"]).is_err());
    }
}
