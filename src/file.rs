//! Config file discovery and decoding.
//!
//! A config file is addressed one of two ways:
//!
//! - **Explicit file**: a path used as given. Its format comes from the
//!   configured type or the extension. A path with no extension and no type is
//!   tried with each supported extension appended (`config` → `config.toml`,
//!   `config.yaml`, ...).
//! - **Name search**: a bare name looked up in each search location in order.
//!   Within a location every candidate extension is tried (only the configured
//!   type's, if one is set). The first existing file wins.
//!
//! Decoding turns any supported format into a `toml::Table`, the one value
//! representation the store works with.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::FlagbindError;
use crate::types::{ConfigFormat, SearchPath};

/// Resolve a [`SearchPath`] to a concrete directory.
///
/// Returns `None` if the path cannot be resolved (e.g. no home directory found).
pub fn resolve_search_path(sp: &SearchPath) -> Option<PathBuf> {
    match sp {
        SearchPath::Home(subdir) => {
            let user = directories::UserDirs::new()?;
            Some(user.home_dir().join(subdir))
        }
        SearchPath::Cwd => std::env::current_dir().ok(),
        SearchPath::Path(p) => Some(p.clone()),
    }
}

/// Candidate files for an explicitly configured path.
pub fn file_candidates(
    file: &Path,
    format: Option<ConfigFormat>,
) -> Result<Vec<(PathBuf, ConfigFormat)>, FlagbindError> {
    if let Some(format) = format {
        return Ok(vec![(file.to_path_buf(), format)]);
    }
    match file.extension() {
        Some(_) => Ok(vec![(file.to_path_buf(), ConfigFormat::from_path(file)?)]),
        None => Ok(with_extensions(file, None)),
    }
}

/// Candidate files for `name` across `dirs`, in search order.
pub fn search_candidates(
    dirs: &[PathBuf],
    name: &str,
    format: Option<ConfigFormat>,
) -> Vec<(PathBuf, ConfigFormat)> {
    dirs.iter()
        .flat_map(|dir| with_extensions(&dir.join(name), format))
        .collect()
}

/// The first candidate that exists as a file.
pub fn first_existing(candidates: &[(PathBuf, ConfigFormat)]) -> Option<(PathBuf, ConfigFormat)> {
    candidates.iter().find(|(path, _)| path.is_file()).cloned()
}

fn with_extensions(base: &Path, format: Option<ConfigFormat>) -> Vec<(PathBuf, ConfigFormat)> {
    let exts: &[&str] = match format {
        Some(f) => f.extensions(),
        None => &ConfigFormat::EXTENSIONS,
    };
    exts.iter()
        .filter_map(|&ext| {
            let format: ConfigFormat = ext.parse().ok()?;
            let mut name = OsString::from(base.as_os_str());
            name.push(".");
            name.push(ext);
            Some((PathBuf::from(name), format))
        })
        .collect()
}

/// Read and decode a config file.
pub fn read_config(path: &Path, format: ConfigFormat) -> Result<Table, FlagbindError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FlagbindError::ConfigFileNotFound {
                name: path.display().to_string(),
                locations: path.parent().map(Path::to_path_buf).into_iter().collect(),
            }
        } else {
            FlagbindError::IoError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_config(path, &content, format)
}

/// Decode `content` in the given format into a table.
///
/// YAML and JSON nulls mean "absent": null map entries are dropped, so a key
/// written without a value falls through to the lower layers.
pub fn parse_config(path: &Path, content: &str, format: ConfigFormat) -> Result<Table, FlagbindError> {
    let parse_error = |reason: String| FlagbindError::ParseError {
        path: path.to_path_buf(),
        reason,
    };

    if content.trim().is_empty() {
        return Ok(Table::new());
    }

    let value = match format {
        ConfigFormat::Toml => {
            return content
                .parse::<Table>()
                .map_err(|e| parse_error(e.to_string()));
        }
        ConfigFormat::Yaml => {
            let doc: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            from_yaml(doc).map_err(parse_error)?
        }
        ConfigFormat::Json => {
            let doc: serde_json::Value =
                serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
            from_json(doc).map_err(parse_error)?
        }
    };

    match value {
        None => Ok(Table::new()),
        Some(Value::Table(table)) => Ok(table),
        Some(other) => Err(parse_error(format!(
            "expected a mapping at the top level, found {}",
            other.type_str()
        ))),
    }
}

/// Convert a YAML document into a TOML value; `None` for null.
fn from_yaml(value: serde_yaml::Value) -> Result<Option<Value>, String> {
    use serde_yaml::Value as Yaml;

    let value = match value {
        Yaml::Null => return Ok(None),
        Yaml::Bool(b) => Value::Boolean(b),
        Yaml::Number(n) => number(n.as_i64(), n.is_u64(), n.as_f64(), &n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(|item| from_yaml(item)?.ok_or_else(null_element))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut table = Table::new();
            for (key, value) in map {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported mapping key {other:?}")),
                };
                if let Some(value) = from_yaml(value)? {
                    table.insert(key, value);
                }
            }
            Value::Table(table)
        }
        Yaml::Tagged(tagged) => return from_yaml(tagged.value),
    };
    Ok(Some(value))
}

/// Convert a JSON document into a TOML value; `None` for null.
fn from_json(value: serde_json::Value) -> Result<Option<Value>, String> {
    use serde_json::Value as Json;

    let value = match value {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => number(n.as_i64(), n.is_u64(), n.as_f64(), &n)?,
        Json::String(s) => Value::String(s),
        Json::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| from_json(item)?.ok_or_else(null_element))
                .collect::<Result<_, _>>()?,
        ),
        Json::Object(map) => {
            let mut table = Table::new();
            for (key, value) in map {
                if let Some(value) = from_json(value)? {
                    table.insert(key, value);
                }
            }
            Value::Table(table)
        }
    };
    Ok(Some(value))
}

fn number(
    int: Option<i64>,
    unsigned: bool,
    float: Option<f64>,
    raw: &dyn std::fmt::Display,
) -> Result<Value, String> {
    if let Some(i) = int {
        return Ok(Value::Integer(i));
    }
    if unsigned {
        return Err(format!("integer {raw} is larger than {}", i64::MAX));
    }
    float
        .map(Value::Float)
        .ok_or_else(|| format!("unsupported number {raw}"))
}

fn null_element() -> String {
    "lists cannot contain null".to_string()
}
