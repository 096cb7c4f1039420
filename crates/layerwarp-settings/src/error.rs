//! Error types for the settings crate.
//!
//! This module provides structured error types for configuration loading
//! and validation.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A configuration validation error occurred.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to configuration validation.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// The configuration file format is not supported.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is empty or otherwise unusable.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Platform is not supported for config directory resolution.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
