//! metacxx configuration
//!
//! Engine settings live in a single TOML document. Every table and every
//! key is optional; missing keys take their defaults.
//!
//! ```toml
//! [eval]
//! max_depth = 512
//! max_steps = 1000000
//!
//! [diagnostics]
//! format = "json"
//! show_notes = true
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Usage
//!
//! ```rust
//! use metacxx::util::config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("[eval]\nmax_depth = 64\n").unwrap();
//! assert_eq!(config.eval.max_depth, 64);
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::util::logger::LogLevel;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Constant evaluation limits
    #[serde(default)]
    pub eval: EvalConfig,
    /// Diagnostic output settings
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Limits applied to every metaprogram evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvalConfig {
    /// Maximum call depth
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum number of evaluation steps per evaluation
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,
}

fn default_max_depth() -> usize {
    512
}

fn default_max_steps() -> u64 {
    1_000_000
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_steps: default_max_steps(),
        }
    }
}

/// Rendering format for collected diagnostics
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticFormat {
    #[default]
    Text,
    Json,
}

/// Diagnostic output settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Output format
    #[serde(default)]
    pub format: DiagnosticFormat,
    /// Render attached notes
    #[serde(default = "default_show_notes")]
    pub show_notes: bool,
}

fn default_show_notes() -> bool {
    true
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            format: DiagnosticFormat::Text,
            show_notes: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LoggingConfig {
    /// Minimum level to emit
    #[serde(default)]
    pub level: LogLevel,
}

impl EngineConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings the evaluator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eval.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "eval.max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.eval.max_steps == 0 {
            return Err(ConfigError::Invalid {
                field: "eval.max_steps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Load a configuration file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    EngineConfig::from_toml_str(&content)
}

/// Load a configuration file if it exists, otherwise use defaults
pub fn load_config_or_default(path: &Path) -> anyhow::Result<EngineConfig> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }
    load_config(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.eval.max_depth, 512);
        assert!(config.diagnostics.show_notes);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_tables() {
        let config = EngineConfig::from_toml_str(
            r#"
            [eval]
            max_steps = 42

            [diagnostics]
            format = "json"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.eval.max_steps, 42);
        assert_eq!(config.eval.max_depth, 512);
        assert_eq!(config.diagnostics.format, DiagnosticFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = EngineConfig::from_toml_str("[eval]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "eval.max_depth", .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_toml_str("[eval\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = EngineConfig::default();
        config.eval.max_depth = 7;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = load_config_or_default(Path::new("/nonexistent/metacxx.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
