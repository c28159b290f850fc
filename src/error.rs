//! Error types

use std::path::PathBuf;
use thiserror::Error;

/// Why a file's measurements could not be obtained
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("could not parse {tool} output: {message}")]
    Parse { tool: String, message: String },

    #[error("not a RIFF/WAVE file: {0}")]
    InvalidWave(String),

    #[error("no recorded probe result for {0:?}")]
    NotRecorded(PathBuf),

    #[error("recorded probe failure: {0}")]
    Recorded(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    pub(crate) fn parse(tool: &str, message: impl Into<String>) -> Self {
        ProbeError::Parse {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Invalid run configuration; aborts the run before any file is probed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("conformance policy not found: {0:?}")]
    MissingPolicy(PathBuf),

    #[error("failed to write embedded conformance policy: {0}")]
    EmbeddedPolicy(#[source] std::io::Error),
}
