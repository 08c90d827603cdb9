//! Framing limits configuration.

use mqcodec_core::stream::MAX_PACKET_SIZE;
use mqcodec_core::Limits;
use serde::Deserialize;

/// Default maximum packet size (1MB).
pub const DEFAULT_MAX_PACKET_SIZE: usize = 1024 * 1024;

/// Limits configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum MQTT packet size in bytes (0 = no limit).
    /// Larger packets abort the inspection before they are buffered.
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
}

fn default_max_packet_size() -> usize {
    DEFAULT_MAX_PACKET_SIZE
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_packet_size: DEFAULT_MAX_PACKET_SIZE,
        }
    }
}

impl LimitsConfig {
    /// Validate the limits configuration.
    pub fn validate(&self) -> Result<(), String> {
        // Largest remaining length plus a 5-byte fixed header
        if self.max_packet_size > MAX_PACKET_SIZE {
            return Err(format!(
                "max_packet_size cannot exceed MQTT protocol maximum ({})",
                MAX_PACKET_SIZE
            ));
        }
        Ok(())
    }

    pub fn to_limits(&self) -> Limits {
        Limits {
            max_packet_size: self.max_packet_size,
        }
    }
}
