//! # docmodel-cli — Command-Line Front End
//!
//! Provides the `docmodel` binary, a thin surface over `docmodel-schema`.
//!
//! ## Subcommands
//!
//! - `docmodel validate`: validate an instance document, printing the
//!   consolidated diagnostic on failure.
//! - `docmodel resolve`: rebuild a typed object tree from an instance and
//!   print it.
//! - `docmodel hash`: print structural schema digests.
//! - `docmodel fields`: list the property setters of a type.
//!
//! Every subcommand takes a root schema (`--schema`) and optionally a
//! definition name (`--definition`) selecting the type to work with.
//! Documents may be JSON or YAML, chosen by file extension.
//!
//! ## Exit Codes
//!
//! `0` success, `1` validation failure, `2` operational error.

pub mod fields;
pub mod hash;
pub mod resolve;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use docmodel_schema::{SchemaType, TypeRegistry};
use serde_json::Value;

/// Root schema and type selection shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Root schema document (JSON or YAML).
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Definition to use as the type, instead of the root schema.
    #[arg(long, value_name = "NAME")]
    pub definition: Option<String>,
}

impl SchemaArgs {
    /// Load the root schema and build its type registry.
    pub fn load_registry(&self) -> Result<TypeRegistry> {
        let root = load_document(&self.schema)?;
        TypeRegistry::from_root_definitions(root)
            .with_context(|| format!("failed to register types from {}", self.schema.display()))
    }

    /// The selected type: the named definition, or the root type.
    pub fn select_type(&self, registry: &TypeRegistry) -> Result<Arc<SchemaType>> {
        match &self.definition {
            Some(name) => registry
                .get(name)
                .cloned()
                .with_context(|| format!("no definition named {name:?} in {}", self.schema.display())),
            None => registry
                .types()
                .first()
                .cloned()
                .context("schema registered no types"),
        }
    }
}

/// Read a JSON or YAML document. `.yaml`/`.yml` files are parsed as YAML,
/// everything else as JSON.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("failed to parse YAML {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("failed to parse JSON {}", path.display()))
    }
}
