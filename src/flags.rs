//! The command surface: an ordered set of typed flags.
//!
//! `FlagSet` holds flag definitions and their live values independent of any
//! argument parser. Flags are kept in registration order, which for generated
//! flags is the schema's declaration order. The clap adapter (see `cli`) turns
//! a `FlagSet` into clap args and feeds parsed values back through
//! [`FlagSet::set`].
//!
//! A [`Flag`] shares its value cell with every clone, so a store binding made
//! before argument parsing still sees the value once the flag is set.

use std::cell::RefCell;
use std::rc::Rc;

use toml::Value;

use crate::error::FlagbindError;
use crate::flag_type::FlagType;
use crate::schema::Kind;

#[derive(Debug, Clone)]
pub struct Flag {
    name: String,
    flag_type: FlagType,
    kind: Kind,
    usage: String,
    default: Option<Value>,
    value: Rc<RefCell<Option<Value>>>,
}

impl Flag {
    fn new(name: &str, flag_type: FlagType, kind: Kind, usage: &str) -> Self {
        let default = flag_type.zero_value(&kind);
        Self {
            name: name.to_string(),
            flag_type,
            kind,
            usage: usage.to_string(),
            default,
            value: Rc::new(RefCell::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag_type(&self) -> FlagType {
        self.flag_type
    }

    /// Schema kind the flag was generated from.
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn set_usage(&mut self, usage: String) {
        self.usage = usage;
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the flag was set explicitly.
    pub fn changed(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// The explicitly set value, if any.
    pub fn explicit_value(&self) -> Option<Value> {
        self.value.borrow().clone()
    }

    /// The explicitly set value, falling back to the default.
    pub fn value(&self) -> Option<Value> {
        self.explicit_value().or_else(|| self.default.clone())
    }

    /// Parse `raw` and record it as the flag's value.
    ///
    /// The first call replaces the default. Later calls on a list flag append,
    /// so `--ports 1 --ports 2,3` yields `[1, 2, 3]`.
    pub fn set(&self, raw: &str) -> Result<(), FlagbindError> {
        let parsed = self
            .flag_type
            .parse(&self.kind, raw)
            .map_err(|reason| FlagbindError::InvalidValue {
                key: self.name.clone(),
                reason,
            })?;
        let mut current = self.value.borrow_mut();
        match (&mut *current, parsed) {
            (Some(Value::Array(items)), Value::Array(more)) if self.flag_type.is_list() => {
                items.extend(more);
            }
            (slot, parsed) => *slot = Some(parsed),
        }
        Ok(())
    }

    /// Validate `raw` without recording it.
    pub fn check(&self, raw: &str) -> Result<(), String> {
        self.flag_type.parse(&self.kind, raw).map(|_| ())
    }
}

#[derive(Debug, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag. Re-registering a name replaces the earlier flag in
    /// place and keeps its position.
    pub fn register(&mut self, name: &str, flag_type: FlagType, kind: Kind, usage: &str) -> &Flag {
        let flag = Flag::new(name, flag_type, kind, usage);
        let idx = match self.flags.iter().position(|f| f.name == name) {
            Some(idx) => {
                tracing::warn!(flag = name, "flag redefined, replacing earlier definition");
                self.flags[idx] = flag;
                idx
            }
            None => {
                self.flags.push(flag);
                self.flags.len() - 1
            }
        };
        &self.flags[idx]
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.name == name)
    }

    /// Set a flag by name from its textual form.
    pub fn set(&self, name: &str, raw: &str) -> Result<(), FlagbindError> {
        self.lookup(name)
            .ok_or_else(|| FlagbindError::FlagNotFound(name.to_string()))?
            .set(raw)
    }

    /// Whether the named flag was set explicitly. Unknown names are unchanged.
    pub fn changed(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(Flag::changed)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Flag> {
        self.flags.iter_mut()
    }

    pub fn names(&self) -> Vec<&str> {
        self.flags.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn type_names(&self) -> Vec<&'static str> {
        self.flags.iter().map(|f| f.flag_type.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
