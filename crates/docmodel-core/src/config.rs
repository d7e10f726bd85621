//! # Settings
//!
//! Tunables for validation, diagnostics, and reference resolution. Every
//! field has a default, so an empty YAML file is a valid settings file.
//!
//! ```yaml
//! debug_mode: false
//! max_error_groups: 3
//! table_width: 80
//! max_ref_depth: 64
//! ```
//!
//! The environment variable `DOCMODEL_DEBUG_MODE` overrides `debug_mode`
//! (`0`, `false`, `off`, `no` disable it; anything else enables it).

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::debug::{disable_debug_mode, enable_debug_mode};
use crate::error::CoreError;

/// Environment variable overriding [`Settings::debug_mode`].
pub const DEBUG_MODE_ENV: &str = "DOCMODEL_DEBUG_MODE";

const DEFAULT_MAX_REF_DEPTH: usize = 64;

static MAX_REF_DEPTH: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_REF_DEPTH);

/// The `$ref` chain limit installed by [`Settings::apply`].
pub fn max_ref_depth() -> usize {
    MAX_REF_DEPTH.load(Ordering::SeqCst)
}

/// Runtime settings for the document model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Validate document objects eagerly at construction.
    pub debug_mode: bool,
    /// Maximum number of error sections in a consolidated diagnostic.
    pub max_error_groups: usize,
    /// Width budget of the field-name table in unknown-field diagnostics.
    pub table_width: usize,
    /// Maximum length of a `$ref` chain before resolution gives up.
    pub max_ref_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_mode: true,
            max_error_groups: 3,
            table_width: 80,
            max_ref_depth: DEFAULT_MAX_REF_DEPTH,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, then apply environment overrides.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::from_yaml_str(&content).map_err(|reason| CoreError::Settings {
            path: path.display().to_string(),
            reason,
        })?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings
    }

    fn from_yaml_str(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(DEBUG_MODE_ENV) {
            self.debug_mode = parse_flag(&raw);
        }
    }

    /// Install `debug_mode` and `max_ref_depth` process-wide.
    pub fn apply(&self) {
        MAX_REF_DEPTH.store(self.max_ref_depth, Ordering::SeqCst);
        if self.debug_mode {
            enable_debug_mode();
        } else {
            disable_debug_mode();
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
