use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::FlagbindError;

/// A location searched for a named config file.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// A subdirectory under the user's home directory, e.g. `Home(".myapp")`.
    Home(&'static str),
    /// Current working directory.
    Cwd,
    /// An explicit path, absolute or relative to the working directory.
    Path(PathBuf),
}

impl From<&str> for SearchPath {
    fn from(path: &str) -> Self {
        if path == "." {
            SearchPath::Cwd
        } else {
            SearchPath::Path(PathBuf::from(path))
        }
    }
}

impl From<PathBuf> for SearchPath {
    fn from(path: PathBuf) -> Self {
        SearchPath::Path(path)
    }
}

/// Structured format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Extensions tried, in order, when searching by name without a type.
    pub const EXTENSIONS: [&'static str; 4] = ["toml", "yaml", "yml", "json"];

    /// Infer the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, FlagbindError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    /// Every extension a file of this type may carry, canonical one first.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
            ConfigFormat::Json => &["json"],
        }
    }

    /// Canonical extension of this type.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = FlagbindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(FlagbindError::UnsupportedConfigType(s.to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
