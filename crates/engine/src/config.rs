//! Service configuration via `recordkit.toml`
//!
//! One file per service, usually next to the binary's other configuration.
//! Every section and field is optional; a missing file yields the defaults.

use recordkit_core::{PersistError, Result};
use recordkit_storage::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up by [`RecordkitConfig::load`].
pub const CONFIG_FILE_NAME: &str = "recordkit.toml";

/// Orchestrator settings, the `[service]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Human-readable entity name used in error messages. Falls back to the
    /// record type name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
}

impl ServiceConfig {
    /// Config with an explicit descriptor
    pub fn with_descriptor(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: Some(descriptor.into()),
        }
    }
}

/// Configuration loaded from `recordkit.toml`.
///
/// # Example
///
/// ```toml
/// [service]
/// descriptor = "Widget"
///
/// [store]
/// name = "widgets"
/// delete_policy = "soft"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordkitConfig {
    /// Orchestrator settings
    pub service: ServiceConfig,
    /// Table settings
    pub store: StoreConfig,
}

impl RecordkitConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# recordkit service configuration

[service]
# Entity name used in error messages, e.g. "Widget entity was not found".
# Defaults to the record type name.
# descriptor = "Widget"

[store]
# Table name used in logs. Defaults to the record type name.
# name = "widgets"

# What delete does: "hard" (default) removes the record,
# "soft" keeps it, marks it inactive and bumps its version.
delete_policy = "hard"
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// [`PersistError::Configuration`] if the text is not valid config.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            PersistError::Configuration(format!("Failed to parse config: {}", e))
        })
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// [`PersistError::Configuration`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PersistError::Configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            PersistError::Configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load `recordkit.toml` from `dir`, or the defaults if there is none.
    ///
    /// # Errors
    ///
    /// [`PersistError::Configuration`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    ///
    /// # Errors
    ///
    /// [`PersistError::Configuration`] if the file cannot be written.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                PersistError::Configuration(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    ///
    /// # Errors
    ///
    /// [`PersistError::Configuration`] if serialization or the write fails.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            PersistError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            PersistError::Configuration(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
