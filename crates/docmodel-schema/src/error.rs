//! # Error Types
//!
//! Everything the object model surfaces to a caller is a [`SchemaError`].
//! Validation failures arrive already consolidated as
//! [`SchemaValidationError`]; the raw validator output is reachable only
//! through [`SchemaValidationError::groups`].

use thiserror::Error;

use crate::consolidate::SchemaValidationError;

/// Errors returned by the document object model.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A `$ref` chain revisited a reference or exceeded the depth limit.
    #[error("reference cycle while resolving {reference:?} (chain: {})", chain.join(" -> "))]
    SchemaCycle {
        /// The reference at which resolution stopped.
        reference: String,
        /// References followed so far, in order.
        chain: Vec<String>,
    },

    /// A `$ref` pointed outside the root document or at a missing node.
    #[error("unresolvable reference {reference:?}")]
    UnresolvableReference {
        /// The offending reference.
        reference: String,
    },

    /// Positional and named construction were mixed, or a named-field
    /// operation was invoked on a positional instance.
    #[error("{type_name}: {reason}")]
    StructuralConstraint {
        /// Wrapper type involved.
        type_name: String,
        /// What was violated.
        reason: String,
    },

    /// The instance did not conform to its schema.
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    /// A type without a bound schema was instantiated.
    #[error("cannot instantiate {type_name}: no schema is bound to this type")]
    MissingSchema {
        /// Wrapper type involved.
        type_name: String,
    },

    /// The validator backend rejected a (trusted) schema.
    #[error("failed to compile schema: {reason}")]
    Compile {
        /// Backend message.
        reason: String,
    },

    /// JSON text could not be parsed or produced.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the foundational layer.
    #[error(transparent)]
    Core(#[from] docmodel_core::CoreError),
}

impl SchemaError {
    pub(crate) fn structural(type_name: &str, reason: impl Into<String>) -> Self {
        SchemaError::StructuralConstraint {
            type_name: type_name.to_string(),
            reason: reason.into(),
        }
    }

    /// The consolidated diagnostic, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&SchemaValidationError> {
        match self {
            SchemaError::Validation(e) => Some(e),
            _ => None,
        }
    }
}
