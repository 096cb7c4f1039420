//! Layerwarp Settings Crate
//!
//! Handles orchestrator configuration: history label, carrier naming,
//! failure cleanup and re-entrancy policy.

pub mod config;
pub mod error;

pub use config::{ReentrancyPolicy, TransformConfig};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
