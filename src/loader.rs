//! One-call loading: file source, search locations and env binding.
//!
//! [`LoadOptions`] collects what the caller knows about its config file; [`load`]
//! registers it with the store, reads it and binds env vars to the flags.
//!
//! ```ignore
//! let opts = LoadOptions::new()
//!     .config_name("myapp")
//!     .config_type("yaml")
//!     .env_prefix("MYAPP")
//!     .auto_bind_env(true);
//! match load(&mut store, &mut flags, &opts) {
//!     Err(e) if e.is_not_found() => {} // defaults, env and flags still apply
//!     other => other?,
//! }
//! ```

use crate::env;
use crate::error::FlagbindError;
use crate::flags::FlagSet;
use crate::store::{DEFAULT_CONFIG_NAME, Store};
use crate::types::{ConfigFormat, SearchPath};

/// Locations searched when the caller names none.
pub const DEFAULT_SEARCH_PATHS: [&str; 2] = ["./configs", "."];

/// Options for [`load`].
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    config_file: Option<String>,
    config_name: Option<String>,
    config_type: Option<String>,
    search_paths: Vec<SearchPath>,
    env_prefix: String,
    auto_bind_env: bool,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this exact file. Its format is taken from the extension. Wins over
    /// [`config_name`](Self::config_name).
    pub fn config_file(mut self, path: &str) -> Self {
        self.config_file = non_empty(path);
        self
    }

    /// Search for a file with this base name (no extension).
    pub fn config_name(mut self, name: &str) -> Self {
        self.config_name = non_empty(name);
        self
    }

    /// Format of the named file: `toml`, `yaml`, `yml` or `json`.
    /// Without one, every supported extension is tried.
    pub fn config_type(mut self, format: &str) -> Self {
        self.config_type = non_empty(format);
        self
    }

    /// Append a search location. Earlier locations win.
    pub fn search_path(mut self, path: impl Into<SearchPath>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Replace the search locations (default: `./configs`, then `.`).
    pub fn search_paths<P: Into<SearchPath>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Bind every flag to its env var once the file is read (or found missing).
    pub fn auto_bind_env(mut self, enabled: bool) -> Self {
        self.auto_bind_env = enabled;
        self
    }

    fn effective_search_paths(&self) -> Vec<SearchPath> {
        if self.search_paths.is_empty() {
            DEFAULT_SEARCH_PATHS.iter().map(|&p| SearchPath::from(p)).collect()
        } else {
            self.search_paths.clone()
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Register the config source described by `opts`, read it, and optionally
/// bind env vars to every flag in `flags`.
///
/// A missing file returns [`FlagbindError::ConfigFileNotFound`] after env
/// binding has been done, so a caller that tolerates the absence still gets
/// env overrides. Any other error leaves the flags unbound.
pub fn load(store: &mut Store, flags: &mut FlagSet, opts: &LoadOptions) -> Result<(), FlagbindError> {
    match (&opts.config_file, &opts.config_name) {
        (Some(file), _) => store.set_config_file(file),
        (None, Some(name)) => {
            store.set_config_name(name);
            if let Some(format) = &opts.config_type {
                store.set_config_type(format.parse::<ConfigFormat>()?);
            }
        }
        (None, None) => store.set_config_file(DEFAULT_CONFIG_NAME),
    }

    for location in opts.effective_search_paths() {
        tracing::debug!(?location, "looking for config file");
        store.add_config_path(location);
    }

    match store.read_in_config() {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            tracing::error!(error = %e, "cannot find the config file");
            if opts.auto_bind_env {
                env::bind_env_vars_to_flags(store, flags, &opts.env_prefix);
            }
            return Err(e);
        }
        Err(e) => {
            tracing::error!(error = %e, "cannot read the config file");
            return Err(e);
        }
    }

    if opts.auto_bind_env {
        env::bind_env_vars_to_flags(store, flags, &opts.env_prefix);
    }
    Ok(())
}
