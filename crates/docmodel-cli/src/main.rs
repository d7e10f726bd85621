//! # docmodel CLI entry point
//!
//! Parses command-line arguments, installs logging and settings, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docmodel_core::Settings;
use tracing_subscriber::EnvFilter;

use docmodel_cli::fields::{run_fields, FieldsArgs};
use docmodel_cli::hash::{run_hash, HashArgs};
use docmodel_cli::resolve::{run_resolve, ResolveArgs};
use docmodel_cli::validate::{run_validate, ValidateArgs};

/// Schema-driven document model toolchain.
///
/// Validates documents with consolidated diagnostics, rebuilds typed object
/// trees, and reports structural schema digests.
#[derive(Parser, Debug)]
#[command(name = "docmodel", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate instance documents and print consolidated diagnostics.
    Validate(ValidateArgs),

    /// Rebuild a typed object tree from an instance document.
    Resolve(ResolveArgs),

    /// Print structural schema digests.
    Hash(HashArgs),

    /// List the property setters of a type.
    Fields(FieldsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = load_settings(&cli).and_then(|settings| {
        settings.apply();
        tracing::debug!(?settings, "settings installed");
        match &cli.command {
            Commands::Validate(args) => run_validate(args, &settings),
            Commands::Resolve(args) => run_resolve(args, &settings),
            Commands::Hash(args) => run_hash(args),
            Commands::Fields(args) => run_fields(args),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => {
            Settings::from_yaml_file(path).with_context(|| format!("failed to load settings from {}", path.display()))
        }
        None => Ok(Settings::from_env()),
    }
}
