//! Report formatting configuration.

use serde::Deserialize;

/// Default number of payload bytes shown per PUBLISH.
pub const DEFAULT_MAX_PAYLOAD_PREVIEW: usize = 64;

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print PUBLISH payloads.
    #[serde(default = "default_true")]
    pub show_payload: bool,

    /// Payloads longer than this are cut, with the full size noted.
    #[serde(default = "default_max_payload_preview")]
    pub max_payload_preview: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_payload_preview() -> usize {
    DEFAULT_MAX_PAYLOAD_PREVIEW
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_payload: true,
            max_payload_preview: DEFAULT_MAX_PAYLOAD_PREVIEW,
        }
    }
}
