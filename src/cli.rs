//! Clap adapter for the generated flags.
//!
//! [`FlagSet`] is framework-agnostic: the core never parses argv. This module,
//! compiled with the `clap` Cargo feature (on by default), turns every flag into
//! a long `--<path>` argument on a [`clap::Command`] and copies the values the
//! user actually typed back into the flags.
//!
//! ```ignore
//! let cmd = flags.augment(Command::new("myapp"));
//! let matches = cmd.get_matches();
//! flags.apply_matches(&matches)?;
//! ```
//!
//! Values are validated by clap with each flag's own parser, so a bad value is
//! reported as a usage error before anything reaches the store. Only values
//! from the command line are transferred; clap defaults would otherwise shadow
//! file and env values.

use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::error::FlagbindError;
use crate::flags::{Flag, FlagSet};
use crate::schema::Kind;

/// Arg ids are namespaced so a generated flag never reads another arg's value.
const ARG_ID_PREFIX: &str = "flagbind:";

fn arg_id(name: &str) -> String {
    format!("{ARG_ID_PREFIX}{name}")
}

impl FlagSet {
    /// Add one long argument per flag to `cmd`.
    ///
    /// A flag with an empty path (a bare scalar schema) has no spelling on the
    /// command line and is left out, as is a flag whose long name is already
    /// taken: clap's own `--help` / `--version`, or an arg `cmd` defines.
    pub fn augment(&self, cmd: Command) -> Command {
        self.iter().fold(cmd, |cmd, flag| {
            if flag.name().is_empty() {
                tracing::warn!("flag with empty path cannot be exposed on the command line");
                return cmd;
            }
            if long_taken(&cmd, flag.name()) {
                tracing::warn!(flag = flag.name(), "long name already in use, flag not exposed");
                return cmd;
            }
            cmd.arg(arg_for(flag))
        })
    }

    /// Copy values given on the command line into the matching flags.
    ///
    /// List flags accumulate every occurrence, in order. Flags that
    /// [`augment`](Self::augment) left out are skipped.
    pub fn apply_matches(&self, matches: &ArgMatches) -> Result<(), FlagbindError> {
        for flag in self.iter() {
            let id = arg_id(flag.name());
            let Ok(Some(values)) = matches.try_get_many::<String>(&id) else {
                continue;
            };
            if matches.value_source(&id) != Some(ValueSource::CommandLine) {
                continue;
            }
            for raw in values {
                flag.set(raw)?;
            }
        }
        Ok(())
    }

    /// Build a command from the flags alone, parse `args` and apply the result.
    pub fn parse_from<I, T>(&self, name: &'static str, args: I) -> Result<ArgMatches, FlagbindError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.augment(Command::new(name)).try_get_matches_from(args)?;
        self.apply_matches(&matches)?;
        Ok(matches)
    }
}

/// Whether `--long` is clap's built-in help or version flag, or an existing arg.
fn long_taken(cmd: &Command, long: &str) -> bool {
    let builtin = match long {
        "help" => !cmd.is_disable_help_flag_set(),
        "version" => {
            (cmd.get_version().is_some() || cmd.get_long_version().is_some())
                && !cmd.is_disable_version_flag_set()
        }
        _ => false,
    };
    builtin
        || cmd
            .get_arguments()
            .any(|a| a.get_long() == Some(long) || a.get_id() == arg_id(long).as_str())
}

fn arg_for(flag: &Flag) -> Arg {
    let flag_type = flag.flag_type();
    let kind = flag.kind().clone();
    let arg = Arg::new(arg_id(flag.name()))
        .long(flag.name().to_string())
        .help(flag.usage().to_string())
        .value_name(flag_type.name())
        .value_parser(move |raw: &str| {
            flag_type
                .parse(&kind, raw)
                .map(|_| raw.to_string())
        });

    if flag_type.is_list() {
        arg.action(ArgAction::Append).value_delimiter(',')
    } else if is_bool(flag.kind()) {
        // `--verbose` alone means true.
        arg.action(ArgAction::Set)
            .num_args(0..=1)
            .default_missing_value("true")
    } else {
        arg.action(ArgAction::Set)
    }
}

fn is_bool(kind: &Kind) -> bool {
    match kind {
        Kind::Bool => true,
        Kind::Optional(inner) => is_bool(inner),
        _ => false,
    }
}
