//! Schema descriptors: the static shape the walker traverses.
//!
//! A configuration struct describes itself through the [`Schema`] trait, usually
//! via `#[derive(Schema)]`. The derive records, for every named field in
//! declaration order, the field name, its two metadata tags and its [`Kind`].
//! Nothing here inspects values at runtime; the descriptor is all the walker
//! needs to synthesize flags.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// Type classification of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Bool,
    String,
    /// `std::time::Duration`. Kept apart from the integer kinds even though a
    /// duration is an integer count underneath.
    Duration,
    /// A list whose element kind drives the list flag type.
    Seq(Box<Kind>),
    /// A value that may be absent. Dispatches as the inner kind, without a default.
    Optional(Box<Kind>),
    /// A nested structure, fields in declaration order.
    Struct(Vec<Field>),
    /// Anything the dispatcher has no dedicated arm for (maps, enums, chars...).
    Other(&'static str),
}

/// One declared field of a [`Kind::Struct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The field name as declared in source.
    pub name: &'static str,
    /// Primary metadata tag: `name`, `name; help comment` or `-`.
    pub flag_tag: Option<&'static str>,
    /// Fallback metadata tag, taken from the decode (serde) attributes.
    pub bind_tag: Option<&'static str>,
    /// Doc comment of the field, joined into one line.
    pub doc: Option<&'static str>,
    pub kind: Kind,
}

impl Field {
    /// A field without any tags or docs.
    pub fn new(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            flag_tag: None,
            bind_tag: None,
            doc: None,
            kind,
        }
    }

    pub fn flag_tag(mut self, tag: &'static str) -> Self {
        self.flag_tag = Some(tag);
        self
    }

    pub fn bind_tag(mut self, tag: &'static str) -> Self {
        self.bind_tag = Some(tag);
        self
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = Some(doc);
        self
    }
}

/// Types that can describe their configuration shape.
pub trait Schema {
    fn kind() -> Kind;
}

macro_rules! impl_schema {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn kind() -> Kind {
                    $kind
                }
            }
        )*
    };
}

impl_schema! {
    i8 => Kind::I8,
    i16 => Kind::I16,
    i32 => Kind::I32,
    i64 => Kind::I64,
    isize => Kind::Isize,
    u8 => Kind::U8,
    u16 => Kind::U16,
    u32 => Kind::U32,
    u64 => Kind::U64,
    usize => Kind::Usize,
    f32 => Kind::F32,
    f64 => Kind::F64,
    bool => Kind::Bool,
    char => Kind::Other("char"),
    String => Kind::String,
    PathBuf => Kind::String,
    Duration => Kind::Duration,
}

impl<T: Schema> Schema for Vec<T> {
    fn kind() -> Kind {
        Kind::Seq(Box::new(T::kind()))
    }
}

impl<T: Schema> Schema for Option<T> {
    fn kind() -> Kind {
        Kind::Optional(Box::new(T::kind()))
    }
}

impl<K, V, S> Schema for HashMap<K, V, S> {
    fn kind() -> Kind {
        Kind::Other("map")
    }
}

impl<K, V> Schema for BTreeMap<K, V> {
    fn kind() -> Kind {
        Kind::Other("map")
    }
}
