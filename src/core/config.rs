//! Configuration management

use crate::core::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub trace: TraceConfig,
    pub discovery: DiscoveryConfig,
    pub format: FormatConfig,
    pub index: IndexConfig,
}

/// Shape of the synthesized trace statements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Prefix of every trace line, followed by `_ENTER` or `_EXIT`
    pub tag: String,
    /// Call that prints one line
    pub writer: String,
    /// Expression evaluating to the current local time
    pub clock: String,
    /// .NET custom format string applied to `clock`
    pub timestamp_format: String,
    /// Namespace that must be imported for `writer` and `clock` to resolve
    pub import: String,
    /// Base name of the local that holds an expression body's value
    pub result_binding: String,
    /// Return type keyword meaning "returns nothing"
    pub no_value_keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Source file extension (without the dot)
    pub extension: String,
    /// Directory names that are never descended into
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Spaces per indentation level
    pub indent_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// File name of the type mapping written into the scanned directory
    pub output_file: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            tag: "AXAL".to_string(),
            writer: "Console.WriteLine".to_string(),
            clock: "DateTime.Now".to_string(),
            timestamp_format: "yyyy-MM-dd HH:mm:ss.ffffff".to_string(),
            import: "System".to_string(),
            result_binding: "__axal_result".to_string(),
            no_value_keyword: "void".to_string(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: SOURCE_EXTENSION.to_string(),
            exclude: vec![],
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            output_file: "class_mapping.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `$AXAL_CONFIG` or the default location
    pub fn load() -> Result<Self> {
        let config_path = match std::env::var("AXAL_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::config_path()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text, filling in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.discovery.extension.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "discovery.extension must not be empty".to_string(),
            });
        }
        if !is_identifier(&self.trace.result_binding) {
            return Err(Error::ConfigError {
                message: format!(
                    "trace.result_binding '{}' is not a valid identifier",
                    self.trace.result_binding
                ),
            });
        }
        if self.format.indent_width == 0 {
            return Err(Error::ConfigError {
                message: "format.indent_width must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = Self::axal_home()?;
        Ok(home.join("config.toml"))
    }

    /// Get the axal home directory
    pub fn axal_home() -> Result<PathBuf> {
        // Check AXAL_HOME env var first
        if let Ok(home) = std::env::var("AXAL_HOME") {
            return Ok(PathBuf::from(home));
        }

        // Use XDG directories
        ProjectDirs::from("dev", "axal", "axal")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| Error::ConfigError {
                message: "Could not determine axal home directory".to_string(),
            })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

pub const SOURCE_EXTENSION: &str = "cs";
pub const DEFAULT_INDENT_WIDTH: usize = 4;
