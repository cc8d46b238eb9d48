//! Configuration file support.
//!
//! Settings are layered, later layers winning:
//! 1. Global config (`~/.cost-blame/config.toml`)
//! 2. Local config (`./.cost-blame.toml`)
//! 3. An explicit `--config` file
//! 4. `COST_BLAME_*` environment variables
//!
//! Command-line flags are applied on top by the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

const DEFAULT_OUTPUT_FORMAT: &str = "table";

/// Log levels accepted in configuration.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBlameConfig {
    /// Named AWS credentials profile.
    #[serde(default)]
    pub profile: Option<String>,

    /// AWS region for the Cost Explorer endpoint.
    #[serde(default)]
    pub region: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,

    /// Billing export to analyse instead of calling AWS.
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Incoming webhook for spike notifications.
    #[serde(default)]
    pub slack_webhook: Option<String>,

    /// Output format preferences
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output format configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (table, json); unset means table
    #[serde(default)]
    pub format: Option<String>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CostBlameConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".cost-blame")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".cost-blame.toml")
    }

    /// Discover and load every configuration layer.
    ///
    /// Missing global or local files are skipped; a missing or invalid
    /// explicit file is an error.
    pub fn discover_and_load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            match Self::load_from_file(&path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "Loaded config layer");
                    config.merge(&layer);
                }
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(path) = explicit {
            config.merge(&Self::load_from_file(path)?);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref profile) = other.profile {
            self.profile = Some(profile.clone());
        }
        if let Some(ref region) = other.region {
            self.region = Some(region.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
        if let Some(ref input) = other.input {
            self.input = Some(input.clone());
        }
        if let Some(ref webhook) = other.slack_webhook {
            self.slack_webhook = Some(webhook.clone());
        }
        if let Some(ref format) = other.output.format {
            self.output.format = Some(format.clone());
        }
    }

    /// Override settings from `COST_BLAME_*` variables found by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(profile) = non_empty("COST_BLAME_PROFILE") {
            self.profile = Some(profile);
        }
        if let Some(region) = non_empty("COST_BLAME_REGION") {
            self.region = Some(region);
        }
        if let Some(webhook) = non_empty("COST_BLAME_SLACK_WEBHOOK") {
            self.slack_webhook = Some(webhook);
        }
    }

    /// Check enumerated values.
    pub fn validate(&self) -> ConfigResult<()> {
        if !matches!(self.output_format(), "table" | "json") {
            return Err(ConfigError::InvalidValue(format!(
                "output.format must be \"table\" or \"json\", got {:?}",
                self.output_format()
            )));
        }
        if let Some(level) = &self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue(format!("unknown log_level {:?}", level)));
            }
        }
        Ok(())
    }

    /// Configured region or [`DEFAULT_REGION`].
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Configured output format or `table`.
    pub fn output_format(&self) -> &str {
        self.output.format.as_deref().unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    /// Whether JSON output is the default.
    pub fn prefers_json(&self) -> bool {
        self.output_format() == "json"
    }
}
