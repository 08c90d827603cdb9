//! Logging configuration.

use serde::Deserialize;

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: error, warn, info, debug, trace.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "log.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.level
            ));
        }
        Ok(())
    }
}
