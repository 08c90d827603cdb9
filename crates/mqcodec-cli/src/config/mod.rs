//! Inspector configuration.
//!
//! Supports configuration from:
//! - TOML file (default: `mqcodec.toml`)
//! - Environment variables with `MQCODEC__` prefix (double underscore for nesting)
//! - In-file variable substitution: `${VAR}` or `${VAR:-default}`
//!
//! Environment variable examples:
//! - `MQCODEC__LOG__LEVEL=trace`
//! - `MQCODEC__LIMITS__MAX_PACKET_SIZE=2097152`
//! - `MQCODEC__OUTPUT__SHOW_PAYLOAD=false`
//!
//! In-file substitution examples:
//! ```toml
//! [limits]
//! max_packet_size = ${MAX_PACKET:-1048576}
//! ```

mod input;
mod limits;
mod log;
mod output;

use std::path::Path;

use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use input::{InputConfig, DEFAULT_READ_BUFFER_SIZE};
use limits::{LimitsConfig, DEFAULT_MAX_PACKET_SIZE};
use log::LogConfig;
use output::DEFAULT_MAX_PAYLOAD_PREVIEW;

pub use output::OutputConfig;

/// Substitute environment variables in a string.
/// Supports `${VAR}` and `${VAR:-default}` syntax.
fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")?;
    Ok(re
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration.
    pub log: LogConfig,
    /// Framing limits.
    pub limits: LimitsConfig,
    /// Input reading.
    pub input: InputConfig,
    /// Report formatting.
    pub output: OutputConfig,
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Substitution pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("log.level", "info")?
            .set_default("limits.max_packet_size", DEFAULT_MAX_PACKET_SIZE as i64)?
            .set_default("input.read_buffer_size", DEFAULT_READ_BUFFER_SIZE as i64)?
            .set_default("output.show_payload", true)?
            .set_default(
                "output.max_payload_preview",
                DEFAULT_MAX_PAYLOAD_PREVIEW as i64,
            )?;

        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let substituted = substitute_env_vars(&content)?;
            builder = builder.add_source(File::from_str(&substituted, FileFormat::Toml));
        }

        // Override with environment variables (MQCODEC__LOG__LEVEL, etc.)
        let cfg = builder
            .add_source(
                Environment::with_prefix("MQCODEC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    #[cfg(test)]
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let substituted = substitute_env_vars(content)?;
        let config: Config = toml::from_str(&substituted)
            .map_err(|e| ConfigError::Validation(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log.validate().map_err(ConfigError::Validation)?;
        self.limits.validate().map_err(ConfigError::Validation)?;
        self.input.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.limits.max_packet_size, DEFAULT_MAX_PACKET_SIZE);
        assert_eq!(config.input.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert!(config.output.show_payload);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[log]
level = "debug"

[limits]
max_packet_size = 2097152

[input]
read_buffer_size = 512

[output]
show_payload = false
max_payload_preview = 16
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.limits.max_packet_size, 2097152);
        assert_eq!(config.input.read_buffer_size, 512);
        assert!(!config.output.show_payload);
        assert_eq!(config.output.max_payload_preview, 16);
    }

    #[test]
    fn test_parse_partial_toml() {
        // Only override some values, rest should use defaults
        let toml = r#"
[limits]
max_packet_size = 512000
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.limits.max_packet_size, 512000);
        assert_eq!(config.input.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert_eq!(
            config.output.max_payload_preview,
            DEFAULT_MAX_PAYLOAD_PREVIEW
        );
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        assert!(matches!(
            Config::parse("[limits]\nmax_packet_size = 300000000\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::parse("[input]\nread_buffer_size = 0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::parse("[log]\nlevel = \"loud\"\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MQCODEC_TEST_PACKET_SIZE", "4096");
        let content = r#"
[limits]
max_packet_size = ${MQCODEC_TEST_PACKET_SIZE}
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.limits.max_packet_size, 4096);
        std::env::remove_var("MQCODEC_TEST_PACKET_SIZE");
    }

    #[test]
    fn test_env_var_substitution_with_default() {
        std::env::remove_var("MQCODEC_NONEXISTENT_VAR");
        let content = r#"level = "${MQCODEC_NONEXISTENT_VAR:-warn}""#;
        let substituted = substitute_env_vars(content).unwrap();
        assert!(substituted.contains("\"warn\""));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/mqcodec.toml").unwrap();
        assert_eq!(config.limits.max_packet_size, DEFAULT_MAX_PACKET_SIZE);
    }
}
