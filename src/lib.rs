//! Command-line flags, environment variables and config files from one
//! struct.
//!
//! Flagbind walks a configuration struct, registers one typed flag per leaf
//! field, binds each flag to an environment variable, and loads a TOML, YAML or
//! JSON file into a layered store. Decode the store and you get the struct back
//! with every source applied in a fixed order.
//!
//! ```ignore
//! #[derive(Schema, Deserialize)]
//! struct AppConfig {
//!     #[flag = "port; where to listen"]
//!     port: u16,
//!     database: DbConfig,
//! }
//!
//! let mut flags = FlagSet::new();
//! let mut store = Store::new();
//! generate_flags::<AppConfig>(&mut flags, &mut store)?;
//!
//! let matches = flags.augment(Command::new("myapp")).get_matches();
//! flags.apply_matches(&matches)?;
//!
//! let opts = LoadOptions::new().config_name("myapp").env_prefix("MYAPP").auto_bind_env(true);
//! match load(&mut store, &mut flags, &opts) {
//!     Err(e) if e.is_not_found() => {}
//!     other => other?,
//! }
//! let config: AppConfig = store.decode()?;
//! ```
//!
//! # Struct as schema
//!
//! `#[derive(Schema)]` records, for every named field in declaration order,
//! its name, its [`Kind`] and two tags:
//!
//! - **`#[flag = "name; help"]`** is the primary tag. `#[flag = "-"]` skips the
//!   field and everything below it. `#[flag = "; help"]` only sets the help.
//! - **serde attributes** are the fallback tag: `#[serde(rename = "..")]`,
//!   a container `#[serde(rename_all = "..")]`, and `#[serde(skip)]` (a skip).
//!   Flags therefore use the same keys the decoder expects.
//! - **`///` doc comments** become the help text when the tag has none.
//!
//! The primary tag always wins, including a primary name over a fallback skip.
//!
//! # Flag paths and types
//!
//! A leaf's flag path is its field names joined with `.`: `c.d` for field `d`
//! of struct field `c`. The same path is the key in the config file and in the
//! store. Flag types follow the field's kind:
//!
//! | Field             | Flag type       |
//! |-------------------|-----------------|
//! | `isize`, `i16`..  | `int`, `int16`.. |
//! | `String`          | `string`        |
//! | `Duration`        | `duration`      |
//! | `Vec<i16>`        | `int32Slice`    |
//! | `Vec<String>`     | `stringSlice`   |
//! | anything else     | `string`        |
//!
//! List types are widened where no narrower one exists. Durations are never
//! treated as integers and take human forms such as `1m30s`.
//!
//! # Layer precedence
//!
//! ```text
//! Flag defaults         zero value of each generated flag
//!        ↑ overridden by
//! Defaults              Store::set_default / set_defaults_from
//!        ↑ overridden by
//! Config file           first match across the search locations
//!        ↑ overridden by
//! Environment vars      PREFIX_PATH, nesting as __
//!        ↑ overridden by
//! Command line          flags the user actually passed
//!        ↑ overridden by
//! Overrides             Store::set
//! ```
//!
//! Every layer is sparse and merged key by key. The [`Store`] is an explicit
//! value: build it once at start-up, populate it, decode, then pass the typed
//! config around.
//!
//! # Environment variables
//!
//! [`bind_env_vars_to_flags`] binds flag `c.d` under prefix `TEST` to
//! `TEST_C__D`, and `favorite-color` under `MYAPP` to `MYAPP_FAVORITE_COLOR`.
//! Each flag's help text gains a note naming its variable. Values are parsed
//! with the flag's own parser, so `TEST_C__E=1,2,3` is a list of integers.
//!
//! # Config files
//!
//! [`load`] takes an explicit file or a base name searched in each location in
//! order (default `./configs`, then `.`), trying every supported extension
//! unless a type is given. A missing file is reported as
//! [`FlagbindError::ConfigFileNotFound`], which callers usually tolerate; a file
//! that exists but does not parse is a [`FlagbindError::ParseError`].
//!
//! # Clap adapter
//!
//! The core never parses argv. With the `clap` feature (on by default),
//! [`FlagSet::augment`] adds a `--<path>` argument per flag and
//! [`FlagSet::apply_matches`] copies what the user typed back into the flags.
//!
//! # Logging
//!
//! Search locations and env bindings are logged with `tracing` at debug level,
//! file errors at error level. The crate never installs a subscriber.

extern crate self as flagbind;

pub mod error;
pub mod types;

#[cfg(feature = "clap")]
mod cli;
mod env;
mod file;
mod flag_type;
mod flags;
mod loader;
pub(crate) mod merge;
mod schema;
mod store;
pub mod tag;
mod walk;

#[cfg(test)]
mod fixtures;

pub use env::{ENV_OVERRIDE_NOTE, bind_env_vars_to_flags, env_var_name};
pub use error::FlagbindError;
pub use flag_type::FlagType;
#[cfg(feature = "derive")]
pub use flagbind_derive::Schema;
pub use flags::{Flag, FlagSet};
pub use loader::{DEFAULT_SEARCH_PATHS, LoadOptions, load};
pub use schema::{Field, Kind, Schema};
pub use store::{DEFAULT_CONFIG_NAME, Store};
pub use tag::Tag;
pub use types::{ConfigFormat, SearchPath};
pub use walk::{generate_flags, walk};
