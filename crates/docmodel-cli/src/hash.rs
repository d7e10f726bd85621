//! # Hash Subcommand
//!
//! Prints the structural digest a type is registered under. Two schemas with
//! the same digest map to the same wrapper type during reconstruction.

use anyhow::Result;
use clap::Args;
use docmodel_core::schema_digest;

use crate::SchemaArgs;

/// Arguments for the `docmodel hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,

    /// Print the digest of every registered type.
    #[arg(long, conflicts_with = "definition")]
    pub all: bool,
}

/// Execute the hash subcommand.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    let registry = args.schema.load_registry()?;
    if args.all {
        for ty in registry.types() {
            println!("{}  {}", schema_digest(ty.schema()?)?, ty.name());
        }
    } else {
        let ty = args.schema.select_type(&registry)?;
        println!("{}", schema_digest(ty.schema()?)?);
    }
    Ok(0)
}
