//! Configuration for worldkeeper tools.
//!
//! Configuration files are YAML (`.yaml`, `.yml`) or JSON (`.json`); every field is
//! optional and falls back to its default:
//!
//! ```yaml
//! data_root: /srv/foundry/Data
//! coerce_types: false
//! core_version: "12.331"
//! system_id: dnd5e
//! system_version: 3.0.0
//! protected_paths:
//!   - _id
//!   - _stats.createdTime
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ProtectedPaths, StoreSettings, ValidateOptions};

/// Default data root when none is configured.
pub const DEFAULT_DATA_ROOT: &str = "./data";

/// Settings shared by the validator, the document store and the command-line tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `worlds/`.
    pub data_root: PathBuf,
    /// Whether the validator coerces strings to booleans.
    pub coerce_types: bool,
    /// Host core version stamped into `_stats.coreVersion`.
    pub core_version: Option<String>,
    /// Game system stamped into `_stats.systemId`.
    pub system_id: Option<String>,
    /// Game system version stamped into `_stats.systemVersion`.
    pub system_version: Option<String>,
    /// Dotted paths updates may never overwrite.
    pub protected_paths: ProtectedPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            coerce_types: false,
            core_version: None,
            system_id: None,
            system_version: None,
            protected_paths: ProtectedPaths::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML or JSON file, chosen by extension.
    ///
    /// Files without a recognised extension are read as YAML, which also accepts JSON.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let parsed = if has_extension(path, &["json"]) {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })
    }

    /// Parses YAML configuration text.
    pub fn from_yaml_str(text: &str) -> Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(text).map_err(|e| e.to_string())
    }

    /// Parses JSON configuration text.
    pub fn from_json_str(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| e.to_string())
    }

    /// The settings the document store stamps into documents.
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            core_version: self.core_version.clone(),
            system_id: self.system_id.clone(),
            system_version: self.system_version.clone(),
            protected_paths: self.protected_paths.clone(),
        }
    }

    /// The options the validator runs with.
    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            coerce_types: self.coerce_types,
        }
    }
}

pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}
