//! # docmodel-schema — Schema-Driven Generic Object Model
//!
//! A runtime representation for documents whose shape is described by a
//! recursive JSON Schema (properties, references, union alternatives).
//!
//! ## Data flow
//!
//! Outbound: a caller builds a [`SchemaObject`] tree, [`SchemaObject::to_dict`]
//! walks it through the value model ([`canonical`]) into a plain
//! `serde_json::Value`, and with validation enabled the [`validate`] module
//! produces raw errors which [`consolidate`] reduces to a ranked
//! [`SchemaValidationError`].
//!
//! Inbound: a canonical value flows into [`TypeRegistry::from_dict`], which
//! follows `$ref`s via [`resolve`], picks wrapper types by structural schema
//! digest, and rebuilds a typed tree.
//!
//! ## Modules
//!
//! - [`resolve`]: `$ref` resolution against a root schema, cycle-safe.
//! - [`value`]: the tri-state field value (present / null / absent).
//! - [`canonical`]: total conversion of field values to canonical JSON.
//! - [`object`]: [`SchemaType`] and the [`SchemaObject`] wrapper.
//! - [`validate`]: raw validation errors, union branches expanded.
//! - [`consolidate`]: grouping, specificity, deduplication, rendering.
//! - [`registry`]: digest-keyed type registry and `from_dict`.
//! - [`setter`]: fluent per-property setters.
//!
//! ## Crate Policy
//!
//! - Raw validator errors never leave this crate unconsolidated: callers see
//!   [`SchemaValidationError`] or another [`SchemaError`] variant.
//! - Schemas are trusted; only instances are validated.

pub mod canonical;
pub mod consolidate;
pub mod error;
pub mod object;
pub mod registry;
pub mod resolve;
pub mod setter;
pub mod validate;
pub mod value;

mod message;

pub use canonical::to_canonical;
pub use consolidate::{
    consolidate, validate_and_consolidate, validate_document, ErrorGroups, RootDefinitions, SchemaValidationError,
    TypeLookup,
};
pub use error::SchemaError;
pub use object::{SchemaObject, SchemaType, ToDictOptions};
pub use registry::TypeRegistry;
pub use resolve::{resolve, resolve_property};
pub use setter::{property_setters, PropertySetter};
pub use validate::{CompiledSchemas, PathSegment, RawValidationError};
pub use value::{FieldValue, ToCanonical};
