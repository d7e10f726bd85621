//! # Resolve Subcommand
//!
//! Rebuilds a typed object tree from an instance document through the type
//! registry and prints it, optionally followed by its canonical JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use docmodel_core::Settings;
use docmodel_schema::SchemaError;

use crate::{load_document, SchemaArgs};

/// Arguments for the `docmodel resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Instance document to rebuild.
    #[arg(value_name = "INSTANCE")]
    pub instance: PathBuf,

    /// Skip validating the instance before rebuilding it.
    #[arg(long)]
    pub no_validate: bool,

    /// Also print the rebuilt object's canonical JSON with this indent.
    #[arg(long, value_name = "N")]
    pub json: Option<usize>,
}

/// Execute the resolve subcommand.
///
/// Returns exit code: 0 on success, 1 if the instance failed validation.
pub fn run_resolve(args: &ResolveArgs, settings: &Settings) -> Result<u8> {
    let registry = args.schema.load_registry()?;
    let ty = args.schema.select_type(&registry)?;
    let instance = load_document(&args.instance)?;

    let obj = match ty.from_dict_with(&registry, &instance, !args.no_validate, settings) {
        Ok(obj) => obj,
        Err(SchemaError::Validation(err)) => {
            println!("FAIL: {}\n{err}", args.instance.display());
            return Ok(1);
        }
        Err(other) => {
            return Err(other).with_context(|| format!("failed to rebuild {}", args.instance.display()));
        }
    };
    tracing::debug!(type_name = obj.type_name(), "rebuilt typed object");

    println!("{obj}");
    if let Some(indent) = args.json {
        println!("{}", obj.to_json(false, Some(indent), true)?);
    }
    Ok(0)
}
