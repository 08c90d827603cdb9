//! Inspector error types.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Codec error at offset {offset}: {source}")]
    Codec {
        offset: u64,
        #[source]
        source: mqcodec_core::Error,
    },

    #[error("Stream ended inside a packet at offset {offset} ({buffered} bytes buffered)")]
    TruncatedStream { offset: u64, buffered: usize },
}

pub type Result<T> = std::result::Result<T, CliError>;
