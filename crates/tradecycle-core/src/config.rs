//! Configuration loading and typed config structures for the trade-cycle
//! server.
//!
//! The canonical configuration lives in a single YAML file (by default
//! `tradecycle.yaml`). This module defines strongly-typed structs that
//! mirror the YAML structure, a loader that reads and validates the file,
//! and a serializer used when an accepted policy update is persisted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tradecycle_types::Policy;

use crate::policy::{self, InvalidLimit};

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse or emit YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// A cycle limit is below `-1`.
    #[error("invalid policy.{field}: {value} (must be -1 or greater)")]
    InvalidLimit {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i32,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<InvalidLimit> for ConfigError {
    fn from(InvalidLimit { field, value }: InvalidLimit) -> Self {
        Self::InvalidLimit { field, value }
    }
}

/// Top-level server configuration.
///
/// All fields have defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The cycle policy loaded into the policy store at startup.
    #[serde(default)]
    pub policy: Policy,

    /// Permission settings for config updates.
    #[serde(default)]
    pub permissions: PermissionsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Demo host population (used by the server binary only).
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

impl ServerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidLimit`] if a cycle limit is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidLimit`] if a cycle limit is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration back to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Check value ranges that the YAML types alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLimit`] for a cycle limit below `-1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        policy::validate(&self.policy).map_err(ConfigError::from)
    }
}

/// Permission settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Permission level a requester needs to update the policy.
    #[serde(default = "default_operator_level")]
    pub operator_level: u8,

    /// Send an explicit "permission denied" message to unauthorized
    /// requesters instead of dropping the update silently.
    #[serde(default)]
    pub notify_unauthorized: bool,

    /// Requester names granted [`operator_level`](Self::operator_level) by
    /// the sandbox host.
    #[serde(default)]
    pub operators: Vec<String>,
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            operator_level: default_operator_level(),
            notify_unauthorized: false,
            operators: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Population of the in-memory demo host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Random seed for reproducible populations and offers.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of villagers to spawn.
    #[serde(default = "default_villagers")]
    pub villagers: u32,

    /// Number of wandering traders to spawn.
    #[serde(default = "default_wandering_traders")]
    pub wandering_traders: u32,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            villagers: default_villagers(),
            wandering_traders: default_wandering_traders(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_operator_level() -> u8 {
    4
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_villagers() -> u32 {
    6
}

const fn default_wandering_traders() -> u32 {
    2
}
