//! # Validate Subcommand
//!
//! Validates instance documents against a type and prints the consolidated
//! diagnostic for each failure. Raw validator output is never printed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use docmodel_core::Settings;
use docmodel_schema::SchemaError;

use crate::{load_document, SchemaArgs};

/// Arguments for the `docmodel validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Instance documents to validate.
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every instance is valid, 1 if any failed.
pub fn run_validate(args: &ValidateArgs, settings: &Settings) -> Result<u8> {
    let registry = args.schema.load_registry()?;
    let ty = args.schema.select_type(&registry)?;
    tracing::info!(type_name = ty.name(), instances = args.instances.len(), "validating");

    let mut failed = 0usize;
    for path in &args.instances {
        let instance = load_document(path)?;
        match ty.validate_with(&instance, None, settings) {
            Ok(()) => println!("OK: {}", path.display()),
            Err(SchemaError::Validation(err)) => {
                failed += 1;
                println!("FAIL: {}\n{err}\n", path.display());
            }
            Err(other) => return Err(other.into()),
        }
    }

    if failed > 0 {
        println!("{failed} of {} instance(s) failed validation.", args.instances.len());
        Ok(1)
    } else {
        Ok(0)
    }
}
