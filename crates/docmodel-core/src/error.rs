//! # Error Types
//!
//! Errors raised by the foundational layer. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for `docmodel-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] serde_json::Error),

    /// A settings file could not be parsed.
    #[error("invalid settings in {path}: {reason}")]
    Settings {
        /// Path of the offending settings file.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    Timestamp {
        /// The rejected input.
        input: String,
        /// Parser message.
        reason: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
