//! Configuration management for cmdcomplete
//!
//! Configuration is read from a TOML file and then overridden by
//! command-line arguments. Every field has a default, so an empty or missing
//! default file is a valid configuration.
//!
//! ```toml
//! [specs]
//! directory = "~/.cmdcomplete/specs"
//!
//! [runtime]
//! generator_timeout_ms = 3000
//!
//! [aliases]
//! g = "git"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::runtime::ShellAlias;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where command specs are loaded from
    #[serde(default)]
    pub specs: SpecsConfig,

    /// Runtime data provider settings
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Shell aliases, name to definition
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Spec storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecsConfig {
    /// Directory holding `<command>.json` spec documents
    #[serde(default = "default_specs_directory")]
    pub directory: PathBuf,
}

/// Runtime data provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Generator timeout in milliseconds
    #[serde(default = "default_generator_timeout")]
    pub generator_timeout_ms: u64,

    /// Directory relative paths are completed against (None for the current one)
    #[serde(default)]
    pub working_directory: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default)]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Output format (plain, json, table)
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Only print suggestions starting with the typed text
    #[serde(default = "default_filter_by_prefix")]
    pub filter_by_prefix: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One suggestion per line, as it would be inserted
    ///
    /// Suitable for: shell integration scripts
    Plain,

    /// Pretty-printed JSON array of suggestions
    Json,

    /// Table with name, kind, and description columns
    Table,
}

// Default value functions
fn default_specs_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cmdcomplete")
        .join("specs")
}

fn default_generator_timeout() -> u64 {
    5000
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_format() -> OutputFormat {
    OutputFormat::Plain
}

fn default_filter_by_prefix() -> bool {
    true
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            directory: default_specs_directory(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            generator_timeout_ms: default_generator_timeout(),
            working_directory: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            filter_by_prefix: default_filter_by_prefix(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// With `None` the default path is tried and a missing file yields the
    /// defaults; an explicitly named file must exist.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::FileNotFound(path.display().to_string()).into());
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cmdcomplete")
            .join("config.toml")
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.runtime.generator_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.generator_timeout_ms".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if let Some((name, _)) = self
            .aliases
            .iter()
            .find(|(name, definition)| name.trim().is_empty() || definition.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "aliases".to_string(),
                value: name.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Get generator timeout as Duration
    pub fn generator_timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.generator_timeout_ms)
    }

    /// Configured aliases in name order
    pub fn shell_aliases(&self) -> Vec<ShellAlias> {
        self.aliases
            .iter()
            .map(|(name, definition)| ShellAlias::new(name.as_str(), definition.as_str()))
            .collect()
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
