//! # docmodel-core — Foundational Types for the Document Model
//!
//! Leaf crate of the workspace. Defines the primitives the object model is
//! built on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One canonical text form.** Schema digests and JSON export both flow
//!    through [`canonical`]. Digest input is RFC 8785 (JCS) so that two
//!    structurally equal schemas always produce the same bytes regardless
//!    of key order.
//!
//! 2. **Structural schema identity.** [`SchemaDigest`] is computed over a
//!    schema with its volatile top-level keys (`definitions`, `title`,
//!    `description`, `$schema`, `id`, ...) removed, so documentation-only
//!    edits never change which wrapper type a schema maps to.
//!
//! 3. **Scoped debug mode.** Eager self-validation at construction is
//!    controlled by a flag that can only be toggled through a guard which
//!    restores the previous value on every exit path.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `docmodel-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod config;
pub mod debug;
pub mod digest;
pub mod error;
pub mod temporal;

pub use canonical::{to_json_string, CanonicalBytes};
pub use config::{max_ref_depth, Settings};
pub use debug::{debug_mode, disable_debug_mode, enable_debug_mode, with_debug_mode, DebugModeGuard};
pub use digest::{schema_digest, SchemaDigest, HASH_EXCLUDED_KEYS};
pub use error::CoreError;
pub use temporal::Temporal;
