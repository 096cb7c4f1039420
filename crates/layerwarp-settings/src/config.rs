//! Configuration for multi-layer transform runs
//!
//! Provides configuration file loading and validation.
//! Supports JSON and TOML file formats; the default location is a
//! platform-specific config directory.
//!
//! Configuration is read-only: the orchestrator never writes it back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsResult};

/// What to do when a run is requested while another run holds the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReentrancyPolicy {
    /// Fail the later request immediately
    Reject,
    /// Wait until the earlier run reaches a terminal state
    Queue,
}

impl Default for ReentrancyPolicy {
    fn default() -> Self {
        Self::Reject
    }
}

impl std::fmt::Display for ReentrancyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Queue => write!(f, "queue"),
        }
    }
}

/// Transform orchestrator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Name of the single history entry a run produces
    pub history_label: String,
    /// Prefix of the temporary carrier layer's name
    pub carrier_prefix: String,
    /// Delete the carrier layer and restore the selection when a run fails
    pub cleanup_on_failure: bool,
    /// Handling of overlapping runs on the same document
    pub reentrancy: ReentrancyPolicy,
    /// Whether hidden active layers are transformed too
    pub include_hidden_layers: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            history_label: "[Plugin]SelectionTranslator".to_string(),
            carrier_prefix: "__tempSelection_".to_string(),
            cleanup_on_failure: true,
            reentrancy: ReentrancyPolicy::Reject,
            include_hidden_layers: false,
        }
    }
}

impl TransformConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(
                    ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into(),
                )
            }
        };

        config.validate()?;
        tracing::debug!("Loaded transform config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Platform-specific default config file path
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("layerwarp").join("config.toml"))
            .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_label.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "history_label".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.carrier_prefix.is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "carrier_prefix".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Name of the carrier layer created at the given Unix time (milliseconds)
    pub fn carrier_name(&self, unix_millis: i64) -> String {
        format!("{}{}", self.carrier_prefix, unix_millis)
    }
}
