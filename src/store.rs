//! The layered configuration store.
//!
//! A `Store` is an explicit instance threaded through flag generation, file
//! loading and env binding. It keeps every source as its own sparse layer and
//! resolves them on demand, lowest precedence first:
//!
//! ```text
//! Flag defaults          zero value of each bound flag
//!        ↑ overridden by
//! Defaults               .set_default() / .set_defaults_from()
//!        ↑ overridden by
//! Config file            .read_in_config()
//!        ↑ overridden by
//! Environment vars       .bind_env() names, then automatic env
//!        ↑ overridden by
//! Changed flags          flags set on the command line
//!        ↑ overridden by
//! Overrides              .set()
//! ```
//!
//! Layers are deep-merged key by key, so a layer only replaces the keys it holds.
//! Lists are values, not sections: a higher layer's list replaces the lower one.
//!
//! The intended lifecycle is build once at start-up, populate, then [`decode`]
//! into the typed config and hand that around. The store does no locking.
//!
//! [`decode`]: Store::decode

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::env;
use crate::error::FlagbindError;
use crate::file;
use crate::flag_type::{self, FlagType};
use crate::flags::Flag;
use crate::merge::{deep_merge, insert_path, leaf_paths, lookup_path, lookup_path_mut};
use crate::types::{ConfigFormat, SearchPath};

/// Name searched for when neither a file nor a name was configured.
pub const DEFAULT_CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, Default)]
enum EnvSource {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    /// Empty values count as unset.
    fn get(&self, name: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct Store {
    config_file: Option<PathBuf>,
    config_name: Option<String>,
    config_type: Option<ConfigFormat>,
    config_paths: Vec<SearchPath>,
    config_file_used: Option<PathBuf>,
    defaults: Table,
    file: Table,
    overrides: Table,
    flags: Vec<(String, Flag)>,
    env_bindings: Vec<(String, String)>,
    env_prefix: Option<String>,
    automatic_env: bool,
    env: EnvSource,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read environment variables from `vars` instead of the process environment.
    pub fn with_env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = EnvSource::Fixed(vars.into_iter().collect());
        self
    }

    /// Use an explicit config file. Takes precedence over name search.
    pub fn set_config_file(&mut self, path: impl Into<PathBuf>) {
        self.config_file = Some(path.into());
    }

    /// Search for a file with this base name (no extension) in the config paths.
    pub fn set_config_name(&mut self, name: &str) {
        self.config_name = Some(name.to_string());
    }

    /// Force the config file format instead of inferring it from the extension.
    pub fn set_config_type(&mut self, format: ConfigFormat) {
        self.config_type = Some(format);
    }

    /// Append a search location. Locations are searched in the order added.
    pub fn add_config_path(&mut self, path: impl Into<SearchPath>) {
        self.config_paths.push(path.into());
    }

    /// The file loaded by the last successful [`read_in_config`](Self::read_in_config).
    pub fn config_file_used(&self) -> Option<&Path> {
        self.config_file_used.as_deref()
    }

    /// Locate and decode the config file into the file layer.
    ///
    /// Returns [`FlagbindError::ConfigFileNotFound`] when no candidate exists and
    /// [`FlagbindError::ParseError`] when the file exists but cannot be decoded.
    /// The file layer is left untouched on error.
    pub fn read_in_config(&mut self) -> Result<(), FlagbindError> {
        let (name, candidates, locations) = match &self.config_file {
            Some(path) => {
                let candidates = file::file_candidates(path, self.config_type)?;
                let locations = candidates.iter().map(|(p, _)| p.clone()).collect();
                (path.display().to_string(), candidates, locations)
            }
            None => {
                let name = self
                    .config_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CONFIG_NAME.to_string());
                let dirs: Vec<PathBuf> = self
                    .config_paths
                    .iter()
                    .filter_map(file::resolve_search_path)
                    .collect();
                let candidates = file::search_candidates(&dirs, &name, self.config_type);
                (name, candidates, dirs)
            }
        };

        let Some((path, format)) = file::first_existing(&candidates) else {
            return Err(FlagbindError::ConfigFileNotFound { name, locations });
        };

        tracing::debug!(path = %path.display(), %format, "reading config file");
        self.file = file::read_config(&path, format)?;
        self.config_file_used = Some(path);
        Ok(())
    }

    /// Bind `key` to a flag so its default and its explicit value take part in
    /// resolution. A missing flag is an error: an unbound key would silently
    /// ignore file and env values meant for that flag.
    pub fn bind_flag(&mut self, key: &str, flag: Option<&Flag>) -> Result<(), FlagbindError> {
        let flag = flag.ok_or_else(|| FlagbindError::FlagNotFound(key.to_string()))?;
        match self.flags.iter_mut().find(|(k, _)| k == key) {
            Some((_, bound)) => *bound = flag.clone(),
            None => self.flags.push((key.to_string(), flag.clone())),
        }
        Ok(())
    }

    /// Read `key` from the environment variable `env_name`.
    pub fn bind_env(&mut self, key: &str, env_name: &str) {
        match self.env_bindings.iter_mut().find(|(k, _)| k == key) {
            Some((_, name)) => *name = env_name.to_string(),
            None => self
                .env_bindings
                .push((key.to_string(), env_name.to_string())),
        }
    }

    pub fn set_env_prefix(&mut self, prefix: &str) {
        self.env_prefix = Some(prefix.to_string());
    }

    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Also look up keys without an explicit env binding, under the name
    /// [`env::env_var_name`] derives from the prefix and the key.
    pub fn automatic_env(&mut self, enabled: bool) {
        self.automatic_env = enabled;
    }

    /// Set a default for `key`, above flag defaults and below everything else.
    pub fn set_default(&mut self, key: &str, value: impl Into<Value>) {
        insert_path(&mut self.defaults, key, value.into());
    }

    /// Use every field of `defaults` as a default, keyed by its serialized name.
    pub fn set_defaults_from<T: Serialize>(&mut self, defaults: &T) -> Result<(), FlagbindError> {
        let value = Value::try_from(defaults).map_err(|e| FlagbindError::InvalidValue {
            key: "<defaults>".into(),
            reason: e.to_string(),
        })?;
        let Value::Table(table) = value else {
            return Err(FlagbindError::InvalidValue {
                key: "<defaults>".into(),
                reason: format!("expected a struct or map, found {}", value.type_str()),
            });
        };
        self.defaults = deep_merge(std::mem::take(&mut self.defaults), table);
        Ok(())
    }

    /// Override `key` above every other source.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        insert_path(&mut self.overrides, key, value.into());
    }

    /// Resolved value of `key`.
    pub fn get(&self, key: &str) -> Result<Option<Value>, FlagbindError> {
        let merged = self.resolve(true)?;
        Ok(lookup_path(&merged, key).cloned())
    }

    /// Whether any source other than a flag's zero value provides `key`.
    pub fn is_set(&self, key: &str) -> Result<bool, FlagbindError> {
        let merged = self.resolve(false)?;
        Ok(lookup_path(&merged, key).is_some())
    }

    /// Every resolved setting as one nested table.
    pub fn all_settings(&self) -> Result<Table, FlagbindError> {
        self.resolve(true)
    }

    /// Resolve all layers and deserialize the result into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FlagbindError> {
        let merged = self.resolve(true)?;
        Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| FlagbindError::DecodeError(e.to_string()))
    }

    fn resolve(&self, with_flag_defaults: bool) -> Result<Table, FlagbindError> {
        let mut merged = Table::new();
        if with_flag_defaults {
            for (key, flag) in &self.flags {
                if let Some(default) = flag.default_value() {
                    insert_path(&mut merged, key, default.clone());
                }
            }
        }
        merged = deep_merge(merged, self.defaults.clone());
        merged = deep_merge(merged, self.file_layer()?);
        merged = deep_merge(merged, self.env_layer()?);
        merged = deep_merge(merged, self.flag_layer());
        merged = deep_merge(merged, self.overrides.clone());
        Ok(merged)
    }

    /// The file layer with duration strings (`"3s"`) turned into durations for
    /// keys bound to duration flags.
    fn file_layer(&self) -> Result<Table, FlagbindError> {
        let mut table = self.file.clone();
        for (key, flag) in &self.flags {
            if flag.flag_type().element() != FlagType::Duration {
                continue;
            }
            let Some(value) = lookup_path_mut(&mut table, key) else {
                continue;
            };
            normalize_duration(value).map_err(|reason| FlagbindError::InvalidValue {
                key: key.clone(),
                reason,
            })?;
        }
        Ok(table)
    }

    fn env_layer(&self) -> Result<Table, FlagbindError> {
        let mut table = Table::new();
        if self.automatic_env {
            let prefix = self.env_prefix.as_deref().unwrap_or_default();
            for key in self.known_keys() {
                if self.env_bindings.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                let env_name = env::env_var_name(prefix, &key);
                if let Some(raw) = self.env.get(&env_name) {
                    let value = self.parse_env(&key, &env_name, &raw)?;
                    insert_path(&mut table, &key, value);
                }
            }
        }
        for (key, env_name) in &self.env_bindings {
            if let Some(raw) = self.env.get(env_name) {
                let value = self.parse_env(key, env_name, &raw)?;
                insert_path(&mut table, key, value);
            }
        }
        Ok(table)
    }

    fn flag_layer(&self) -> Table {
        let mut table = Table::new();
        for (key, flag) in &self.flags {
            if let Some(value) = flag.explicit_value() {
                insert_path(&mut table, key, value);
            }
        }
        table
    }

    /// Parse an env value with the bound flag's parser, or heuristically when
    /// the key has no flag.
    fn parse_env(&self, key: &str, env_name: &str, raw: &str) -> Result<Value, FlagbindError> {
        match self.flags.iter().find(|(k, _)| k == key) {
            Some((_, flag)) => flag.flag_type().parse(flag.kind(), raw).map_err(|reason| {
                FlagbindError::InvalidValue {
                    key: env_name.to_string(),
                    reason,
                }
            }),
            None => Ok(env::parse_env_value(raw)),
        }
    }

    /// Every key any layer below the environment knows about, bound flags first.
    fn known_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.flags.iter().map(|(k, _)| k.clone()).collect();
        for key in leaf_paths(&self.defaults)
            .into_iter()
            .chain(leaf_paths(&self.file))
        {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

/// Strings are human durations; integers count nanoseconds.
fn normalize_duration(value: &mut Value) -> Result<(), String> {
    match value {
        Value::String(raw) => {
            *value = flag_type::duration_value(flag_type::parse_duration(raw.trim())?);
        }
        Value::Integer(nanos) => {
            let nanos = u64::try_from(*nanos)
                .map_err(|_| format!("negative duration {nanos}"))?;
            *value = flag_type::duration_value(Duration::from_nanos(nanos));
        }
        Value::Array(items) => {
            for item in items {
                normalize_duration(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FlagSet;
    use crate::schema::Kind;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn bound(store: &mut Store, flags: &mut FlagSet, key: &str, ty: FlagType, kind: Kind) {
        flags.register(key, ty, kind, "");
        store.bind_flag(key, flags.lookup(key)).unwrap();
    }

    #[test]
    fn bind_missing_flag_fails() {
        let mut store = Store::new();
        let err = store.bind_flag("c.d", None).unwrap_err();
        assert!(matches!(err, FlagbindError::FlagNotFound(k) if k == "c.d"));
    }

    #[test]
    fn flag_default_is_lowest_layer() {
        let mut store = Store::new();
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "port", FlagType::Int, Kind::Isize);
        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(0)));
        assert!(!store.is_set("port").unwrap());

        store.set_default("port", 8080);
        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(8080)));
        assert!(store.is_set("port").unwrap());
    }

    #[test]
    fn precedence_file_env_flag_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "port = 1\nhost = \"file\"\n").unwrap();

        let mut store = Store::new().with_env_vars(vars(&[("APP_PORT", "2")]));
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "port", FlagType::Int, Kind::Isize);
        bound(&mut store, &mut flags, "host", FlagType::String, Kind::String);
        store.bind_env("port", "APP_PORT");
        store.set_config_file(&path);
        store.read_in_config().unwrap();

        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(2)));
        assert_eq!(store.get("host").unwrap(), Some(Value::String("file".into())));

        flags.set("port", "3").unwrap();
        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(3)));

        store.set("port", 4);
        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(4)));
    }

    #[test]
    fn explicit_flag_beats_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "c:\n  d: [v1]\n").unwrap();

        let mut store = Store::new();
        let mut flags = FlagSet::new();
        let kind = Kind::Seq(Box::new(Kind::String));
        bound(&mut store, &mut flags, "c.d", FlagType::StringSlice, kind);
        store.set_config_file(&path);
        store.read_in_config().unwrap();
        flags.set("c.d", "v2").unwrap();

        assert_eq!(
            store.get("c.d").unwrap(),
            Some(Value::Array(vec![Value::String("v2".into())]))
        );
    }

    #[test]
    fn env_values_use_flag_parser() {
        let mut store = Store::new().with_env_vars(vars(&[("T_E", "1,2,3")]));
        let mut flags = FlagSet::new();
        let kind = Kind::Seq(Box::new(Kind::Isize));
        bound(&mut store, &mut flags, "e", FlagType::IntSlice, kind);
        store.bind_env("e", "T_E");
        assert_eq!(
            store.get("e").unwrap(),
            Some(Value::Array(vec![
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3)
            ]))
        );
    }

    #[test]
    fn invalid_env_value_names_the_variable() {
        let mut store = Store::new().with_env_vars(vars(&[("T_PORT", "many")]));
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "port", FlagType::Int, Kind::Isize);
        store.bind_env("port", "T_PORT");
        let err = store.get("port").unwrap_err();
        assert!(err.to_string().contains("T_PORT"));
    }

    #[test]
    fn empty_env_value_is_ignored() {
        let mut store = Store::new().with_env_vars(vars(&[("T_HOST", "")]));
        store.set_default("host", "localhost");
        store.bind_env("host", "T_HOST");
        assert_eq!(
            store.get("host").unwrap(),
            Some(Value::String("localhost".into()))
        );
    }

    #[test]
    fn automatic_env_covers_unbound_file_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "b = \"file\"\n[nested]\nlevel = 1\n").unwrap();

        let mut store =
            Store::new().with_env_vars(vars(&[("TEST_B", "env"), ("TEST_NESTED__LEVEL", "7")]));
        store.set_config_file(&path);
        store.read_in_config().unwrap();
        assert_eq!(store.get("b").unwrap(), Some(Value::String("file".into())));

        store.set_env_prefix("TEST");
        store.automatic_env(true);
        assert_eq!(store.get("b").unwrap(), Some(Value::String("env".into())));
        assert_eq!(store.get("nested.level").unwrap(), Some(Value::Integer(7)));
    }

    #[test]
    fn file_duration_strings_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "timeout: 1m30s\n").unwrap();

        let mut store = Store::new();
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "timeout", FlagType::Duration, Kind::Duration);
        store.set_config_file(&path);
        store.read_in_config().unwrap();

        #[derive(Deserialize)]
        struct Cfg {
            timeout: Duration,
        }
        let cfg: Cfg = store.decode().unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(90));
    }

    #[test]
    fn file_integer_durations_are_nanoseconds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "timeout = 30\nbackoff = [\"1s\", 500]\n").unwrap();

        let mut store = Store::new();
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "timeout", FlagType::Duration, Kind::Duration);
        let list = Kind::Seq(Box::new(Kind::Duration));
        bound(&mut store, &mut flags, "backoff", FlagType::DurationSlice, list);
        store.set_config_file(&path);
        store.read_in_config().unwrap();

        #[derive(Deserialize)]
        struct Cfg {
            timeout: Duration,
            backoff: Vec<Duration>,
        }
        let cfg: Cfg = store.decode().unwrap();
        assert_eq!(cfg.timeout, Duration::from_nanos(30));
        assert_eq!(cfg.backoff, vec![Duration::from_secs(1), Duration::from_nanos(500)]);
    }

    #[test]
    fn negative_file_duration_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(&path, "timeout = -1\n").unwrap();

        let mut store = Store::new();
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "timeout", FlagType::Duration, Kind::Duration);
        store.set_config_file(&path);
        store.read_in_config().unwrap();
        let err = store.get("timeout").unwrap_err();
        assert!(matches!(err, FlagbindError::InvalidValue { key, .. } if key == "timeout"));
    }

    #[test]
    fn env_value_above_i64_is_invalid() {
        let mut store = Store::new().with_env_vars(vars(&[("T_BIG", "18446744073709551615")]));
        let mut flags = FlagSet::new();
        bound(&mut store, &mut flags, "big", FlagType::Uint64, Kind::U64);
        store.bind_env("big", "T_BIG");
        let err = store.get("big").unwrap_err();
        assert!(matches!(err, FlagbindError::InvalidValue { .. }));
    }

    #[test]
    fn search_uses_locations_in_order() {
        let low = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        fs::write(low.path().join("app.toml"), "who = \"first\"\n").unwrap();
        fs::write(high.path().join("app.toml"), "who = \"second\"\n").unwrap();

        let mut store = Store::new();
        store.set_config_name("app");
        store.add_config_path(low.path().to_path_buf());
        store.add_config_path(high.path().to_path_buf());
        store.read_in_config().unwrap();

        assert_eq!(store.get("who").unwrap(), Some(Value::String("first".into())));
        assert_eq!(store.config_file_used(), Some(low.path().join("app.toml").as_path()));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::new();
        store.set_config_name("app");
        store.add_config_path(dir.path().to_path_buf());
        let err = store.read_in_config().unwrap_err();
        assert!(err.is_not_found());
        assert!(store.config_file_used().is_none());
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.yaml");
        fs::write(&path, "a: [1, 2\n").unwrap();
        let mut store = Store::new();
        store.set_config_file(&path);
        let err = store.read_in_config().unwrap_err();
        assert!(matches!(err, FlagbindError::ParseError { .. }));
    }

    #[test]
    fn defaults_from_struct() {
        #[derive(Serialize)]
        struct Defaults {
            host: String,
            port: u16,
            url: Option<String>,
        }
        let mut store = Store::new();
        store
            .set_defaults_from(&Defaults {
                host: "localhost".into(),
                port: 8080,
                url: None,
            })
            .unwrap();
        assert_eq!(store.get("port").unwrap(), Some(Value::Integer(8080)));
        assert_eq!(store.get("url").unwrap(), None);
    }

    #[test]
    fn decode_failure_is_reported() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Cfg {
            port: u16,
        }
        let mut store = Store::new();
        store.set("port", "not a number");
        let err = store.decode::<Cfg>().unwrap_err();
        assert!(matches!(err, FlagbindError::DecodeError(_)));
    }
}
