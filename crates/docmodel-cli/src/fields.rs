//! # Fields Subcommand
//!
//! Lists the property setters of a type with their descriptions.

use anyhow::Result;
use clap::Args;
use docmodel_schema::property_setters;

use crate::SchemaArgs;

/// Arguments for the `docmodel fields` subcommand.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
}

/// Execute the fields subcommand.
pub fn run_fields(args: &FieldsArgs) -> Result<u8> {
    let registry = args.schema.load_registry()?;
    let ty = args.schema.select_type(&registry)?;
    let setters = property_setters(&ty)?;
    if setters.is_empty() {
        println!("{} declares no properties.", ty.name());
    }
    for setter in &setters {
        match setter.description() {
            Some(text) => println!("{}: {}", setter.name(), text),
            None => println!("{}", setter.name()),
        }
    }
    Ok(0)
}
