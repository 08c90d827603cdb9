//! Input configuration.

use serde::Deserialize;

/// Default read chunk size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Input configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Bytes requested per read from the capture.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.read_buffer_size == 0 {
            return Err("read_buffer_size must be at least 1".into());
        }
        Ok(())
    }
}
