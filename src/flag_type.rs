//! Flag types and the kind-to-flag-type dispatch table.
//!
//! Every leaf of a schema maps to exactly one [`FlagType`]. The table is closed:
//! kinds without a dedicated arm become string flags rather than errors, so a
//! schema never fails to produce a flag set. The schema [`Kind`] travels with the
//! flag, which lets a string-typed fallback flag still yield a typed value
//! (`true`, `1.5`) when the store resolves it.

use std::fmt;
use std::time::Duration;

use toml::{Table, Value};

use crate::schema::Kind;

/// Concrete flag type registered on the command surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagType {
    Int,
    Uint,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Duration,
    String,
    IntSlice,
    UintSlice,
    Int32Slice,
    Int64Slice,
    StringSlice,
    DurationSlice,
}

impl FlagType {
    /// Dispatch a field kind to its flag type.
    pub fn for_kind(kind: &Kind) -> FlagType {
        match kind {
            Kind::Optional(inner) => Self::for_kind(inner),
            Kind::Seq(elem) => Self::list_for(elem),
            other => Self::scalar_for(other),
        }
    }

    /// Flag type for a scalar kind.
    pub fn scalar_for(kind: &Kind) -> FlagType {
        match kind {
            // Must stay ahead of the integer arms.
            Kind::Duration => FlagType::Duration,
            Kind::Isize => FlagType::Int,
            Kind::Usize => FlagType::Uint,
            Kind::I16 => FlagType::Int16,
            Kind::U16 => FlagType::Uint16,
            Kind::I32 => FlagType::Int32,
            Kind::U32 => FlagType::Uint32,
            Kind::I64 => FlagType::Int64,
            Kind::U64 => FlagType::Uint64,
            Kind::String => FlagType::String,
            _ => FlagType::String,
        }
    }

    /// List flag type for a sequence with elements of `elem` kind.
    ///
    /// There is no 16-bit list type; 16-bit elements use the 32-bit one. Unsigned
    /// elements widen to the next signed list type that holds every value.
    pub fn list_for(elem: &Kind) -> FlagType {
        match elem {
            Kind::Duration => FlagType::DurationSlice,
            Kind::Optional(inner) => Self::list_for(inner),
            Kind::Isize => FlagType::IntSlice,
            Kind::I16 | Kind::U16 | Kind::I32 => FlagType::Int32Slice,
            Kind::U32 | Kind::I64 => FlagType::Int64Slice,
            Kind::Usize | Kind::U64 => FlagType::UintSlice,
            Kind::String => FlagType::StringSlice,
            _ => FlagType::StringSlice,
        }
    }

    /// Type identifier, e.g. `int` or `stringSlice`.
    pub fn name(&self) -> &'static str {
        match self {
            FlagType::Int => "int",
            FlagType::Uint => "uint",
            FlagType::Int16 => "int16",
            FlagType::Uint16 => "uint16",
            FlagType::Int32 => "int32",
            FlagType::Uint32 => "uint32",
            FlagType::Int64 => "int64",
            FlagType::Uint64 => "uint64",
            FlagType::Duration => "duration",
            FlagType::String => "string",
            FlagType::IntSlice => "intSlice",
            FlagType::UintSlice => "uintSlice",
            FlagType::Int32Slice => "int32Slice",
            FlagType::Int64Slice => "int64Slice",
            FlagType::StringSlice => "stringSlice",
            FlagType::DurationSlice => "durationSlice",
        }
    }

    pub fn is_list(&self) -> bool {
        self.element() != *self
    }

    /// Scalar type of one list element; scalars return themselves.
    pub fn element(&self) -> FlagType {
        match self {
            FlagType::IntSlice => FlagType::Int,
            FlagType::UintSlice => FlagType::Uint,
            FlagType::Int32Slice => FlagType::Int32,
            FlagType::Int64Slice => FlagType::Int64,
            FlagType::StringSlice => FlagType::String,
            FlagType::DurationSlice => FlagType::Duration,
            scalar => *scalar,
        }
    }

    /// Zero value registered as the flag default.
    ///
    /// `None` for kinds whose zero value cannot be expressed (optional values,
    /// maps, enums): those keys stay absent unless a source provides them.
    pub fn zero_value(&self, kind: &Kind) -> Option<Value> {
        if matches!(kind, Kind::Optional(_)) {
            return None;
        }
        if self.is_list() {
            return Some(Value::Array(Vec::new()));
        }
        match self {
            FlagType::Duration => Some(duration_value(Duration::ZERO)),
            FlagType::String => match leaf_kind(kind) {
                Kind::Bool => Some(Value::Boolean(false)),
                Kind::F32 | Kind::F64 => Some(Value::Float(0.0)),
                Kind::I8 | Kind::U8 => Some(Value::Integer(0)),
                Kind::Other(_) => None,
                _ => Some(Value::String(String::new())),
            },
            _ => Some(Value::Integer(0)),
        }
    }

    /// Parse a raw textual value into a typed value.
    ///
    /// List types split `raw` on commas; an empty string is an empty list.
    pub fn parse(&self, kind: &Kind, raw: &str) -> Result<Value, String> {
        if !self.is_list() {
            return self.parse_element(kind, raw);
        }
        if raw.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        raw.split(',')
            .map(|item| self.parse_element(kind, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    /// Parse a single scalar, or a single element of a list type.
    pub fn parse_element(&self, kind: &Kind, raw: &str) -> Result<Value, String> {
        let elem = self.element();
        let trimmed = raw.trim();
        match elem {
            FlagType::Int => parse_int::<isize>(trimmed),
            FlagType::Uint => parse_int::<usize>(trimmed),
            FlagType::Int16 => parse_int::<i16>(trimmed),
            FlagType::Uint16 => parse_int::<u16>(trimmed),
            FlagType::Int32 => parse_int::<i32>(trimmed),
            FlagType::Uint32 => parse_int::<u32>(trimmed),
            FlagType::Int64 => parse_int::<i64>(trimmed),
            FlagType::Uint64 => parse_int::<u64>(trimmed),
            FlagType::Duration => parse_duration(trimmed).map(duration_value),
            _ => coerce_string(leaf_kind(kind), raw),
        }
    }
}

impl fmt::Display for FlagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode a duration the way `std::time::Duration` deserializes.
pub fn duration_value(d: Duration) -> Value {
    let mut table = Table::new();
    table.insert("secs".into(), Value::Integer(d.as_secs() as i64));
    table.insert("nanos".into(), Value::Integer(d.subsec_nanos() as i64));
    Value::Table(table)
}

/// Parse a human duration such as `1h30m`, `500ms` or `3s`. A bare integer is a
/// count of nanoseconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    if let Ok(nanos) = raw.parse::<u64>() {
        return Ok(Duration::from_nanos(nanos));
    }
    humantime::parse_duration(raw).map_err(|e| format!("invalid duration '{raw}': {e}"))
}

/// Innermost scalar kind: strips `Optional` and `Seq` wrappers.
fn leaf_kind(kind: &Kind) -> &Kind {
    match kind {
        Kind::Optional(inner) | Kind::Seq(inner) => leaf_kind(inner),
        other => other,
    }
}

/// Parse an integer of width `T`. Values are carried as `i64`, so unsigned
/// 64-bit flags top out at `i64::MAX`.
fn parse_int<T>(raw: &str) -> Result<Value, String>
where
    T: std::str::FromStr + TryInto<i64>,
    T::Err: fmt::Display,
{
    let parsed: T = raw
        .parse()
        .map_err(|e| format!("invalid integer '{raw}': {e}"))?;
    parsed
        .try_into()
        .map(Value::Integer)
        .map_err(|_| format!("integer '{raw}' is larger than {}", i64::MAX))
}

/// String flags keep their schema kind: bools, floats and 8-bit integers are
/// still produced as typed values.
fn coerce_string(kind: &Kind, raw: &str) -> Result<Value, String> {
    match kind {
        Kind::Bool => parse_bool(raw.trim()).map(Value::Boolean),
        Kind::F32 | Kind::F64 => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("invalid float '{raw}': {e}")),
        Kind::I8 => parse_int::<i8>(raw.trim()),
        Kind::U8 => parse_int::<u8>(raw.trim()),
        _ => Ok(Value::String(raw.to_string())),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(format!("invalid bool '{raw}'")),
    }
}
