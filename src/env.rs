//! Environment variable bindings for generated flags.
//!
//! Every flag path gets one variable, `{PREFIX}_{PATH}`, where the path has
//! `-` turned into `_` and `.` into `__` before upper-casing:
//!
//! | Prefix  | Flag path        | Env var                 |
//! |---------|------------------|-------------------------|
//! | `TEST`  | `c.d`            | `TEST_C__D`             |
//! | `MYAPP` | `favorite-color` | `MYAPP_FAVORITE_COLOR`  |
//!
//! The double underscore keeps nesting distinct from underscores that are part
//! of a field name (`pool_size` vs `pool.size`).

use toml::Value;

use crate::flags::FlagSet;
use crate::store::Store;

/// Help text prefix announcing a flag's env override.
pub const ENV_OVERRIDE_NOTE: &str = "Overrided by Env Var ";

/// Derive the env var name for `flag_path`. An empty prefix yields the
/// transformed path alone.
pub fn env_var_name(prefix: &str, flag_path: &str) -> String {
    let suffix = flag_path.replace('-', "_").replace('.', "__").to_uppercase();
    if prefix.is_empty() {
        suffix
    } else {
        format!("{}_{suffix}", prefix.to_uppercase())
    }
}

/// Bind every flag in `flags` to its env var and disclose it in the help text.
///
/// Also switches the store to automatic env under `prefix`, so keys that only
/// exist in a config file can be overridden the same way. Values already in the
/// store are never pushed into the flags; precedence is left to the store.
pub fn bind_env_vars_to_flags(store: &mut Store, flags: &mut FlagSet, prefix: &str) {
    store.set_env_prefix(prefix);
    store.automatic_env(true);

    for flag in flags.iter_mut() {
        let env_name = env_var_name(prefix, flag.name());
        tracing::debug!(env = %env_name, flag = flag.name(), "binding env to flag");
        store.bind_env(flag.name(), &env_name);

        let note = format!("{ENV_OVERRIDE_NOTE}{env_name}");
        if flag.usage().contains(&note) {
            continue;
        }
        let usage = if flag.usage().is_empty() {
            note
        } else {
            format!("{}. {note}", flag.usage())
        };
        flag.set_usage(usage);
    }
}

/// Parse an env var value for a key with no bound flag.
/// Tries: bool → integer → float → string.
pub(crate) fn parse_env_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if s.contains('.')
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag_type::FlagType;
    use crate::schema::Kind;

    #[test]
    fn nested_path_uses_double_underscore() {
        assert_eq!(env_var_name("TEST", "c.d"), "TEST_C__D");
    }

    #[test]
    fn dashes_become_underscores() {
        assert_eq!(env_var_name("MYAPP", "favorite-color"), "MYAPP_FAVORITE_COLOR");
    }

    #[test]
    fn prefix_is_uppercased() {
        assert_eq!(env_var_name("myapp", "port"), "MYAPP_PORT");
    }

    #[test]
    fn empty_prefix_is_path_only() {
        assert_eq!(env_var_name("", "db.pool-size"), "DB__POOL_SIZE");
    }

    #[test]
    fn binding_appends_note_to_usage() {
        let mut store = Store::new();
        let mut flags = FlagSet::new();
        flags.register("a", FlagType::Int, Kind::Isize, "a simple integer");
        flags.register("c.d", FlagType::StringSlice, Kind::Seq(Box::new(Kind::String)), "");

        bind_env_vars_to_flags(&mut store, &mut flags, "TEST");

        assert_eq!(
            flags.lookup("a").unwrap().usage(),
            "a simple integer. Overrided by Env Var TEST_A"
        );
        assert_eq!(
            flags.lookup("c.d").unwrap().usage(),
            "Overrided by Env Var TEST_C__D"
        );
        assert_eq!(store.env_prefix(), Some("TEST"));
    }

    #[test]
    fn binding_twice_does_not_repeat_note() {
        let mut store = Store::new();
        let mut flags = FlagSet::new();
        flags.register("a", FlagType::Int, Kind::Isize, "");
        bind_env_vars_to_flags(&mut store, &mut flags, "TEST");
        bind_env_vars_to_flags(&mut store, &mut flags, "TEST");
        assert_eq!(
            flags.lookup("a").unwrap().usage(),
            "Overrided by Env Var TEST_A"
        );
    }

    #[test]
    fn bound_env_reaches_store() {
        let mut store = Store::new().with_env_vars(vec![("TEST_C__D".into(), "x,y".into())]);
        let mut flags = FlagSet::new();
        flags.register("c.d", FlagType::StringSlice, Kind::Seq(Box::new(Kind::String)), "");
        store.bind_flag("c.d", flags.lookup("c.d")).unwrap();
        bind_env_vars_to_flags(&mut store, &mut flags, "TEST");
        assert_eq!(
            store.get("c.d").unwrap(),
            Some(Value::Array(vec![
                Value::String("x".into()),
                Value::String("y".into())
            ]))
        );
    }

    #[test]
    fn heuristic_parsing() {
        assert_eq!(parse_env_value("TRUE"), Value::Boolean(true));
        assert_eq!(parse_env_value("-5"), Value::Integer(-5));
        assert_eq!(parse_env_value("1.5"), Value::Float(1.5));
        assert_eq!(parse_env_value("inf"), Value::String("inf".into()));
        assert_eq!(parse_env_value("hello world"), Value::String("hello world".into()));
    }
}
