use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlagbindError {
    #[error("Config file '{name}' not found in {locations:?}")]
    ConfigFileNotFound {
        name: String,
        locations: Vec<PathBuf>,
    },

    #[error("Failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported config type '{0}' (expected toml, yaml, yml or json)")]
    UnsupportedConfigType(String),

    #[error("Flag not found: '{0}'")]
    FlagNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to decode configuration: {0}")]
    DecodeError(String),

    #[cfg(feature = "clap")]
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

impl FlagbindError {
    /// True when no config file was found. Callers that can run on defaults,
    /// env vars and flags alone usually tolerate this one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlagbindError::ConfigFileNotFound { .. })
    }
}
