//! Schema traversal: one flag per leaf.
//!
//! The walker descends a [`Kind`] tree depth-first in declaration order. At each
//! struct field it resolves the field's tags (see [`tag`](crate::tag)); skipped
//! fields are dropped together with their whole subtree. Every leaf becomes a
//! flag named by its dotted path (`c.d`) and is bound into the store under the
//! same path, so flag values, file keys and env bindings all meet on one key.

use crate::error::FlagbindError;
use crate::flag_type::FlagType;
use crate::flags::FlagSet;
use crate::schema::{Kind, Schema};
use crate::store::Store;
use crate::tag;

/// Register one flag per leaf of `C` and bind each into `store`.
pub fn generate_flags<C: Schema>(flags: &mut FlagSet, store: &mut Store) -> Result<(), FlagbindError> {
    walk(flags, store, "", "", "", &C::kind(), false)
}

/// Walk `kind` at `current_path.name`.
///
/// `optional` is set under an `Option<Struct>`: leaves below it get no default,
/// so an absent section stays `None` when decoded.
pub fn walk(
    flags: &mut FlagSet,
    store: &mut Store,
    current_path: &str,
    name: &str,
    help: &str,
    kind: &Kind,
    optional: bool,
) -> Result<(), FlagbindError> {
    let path = if current_path.is_empty() {
        name.to_string()
    } else {
        format!("{current_path}.{name}")
    };

    match kind {
        Kind::Struct(fields) => {
            for field in fields {
                let Some((segment, help)) = tag::visible_name(field) else {
                    tracing::trace!(field = field.name, parent = %path, "skipping field");
                    continue;
                };
                walk(flags, store, &path, &segment, &help, &field.kind, optional)?;
            }
            Ok(())
        }
        Kind::Optional(inner) if matches!(**inner, Kind::Struct(_)) => {
            walk(flags, store, current_path, name, help, inner, true)
        }
        leaf => {
            let flag_type = FlagType::for_kind(leaf);
            let leaf = match leaf {
                Kind::Optional(_) => leaf.clone(),
                _ if optional => Kind::Optional(Box::new(leaf.clone())),
                _ => leaf.clone(),
            };
            flags.register(&path, flag_type, leaf, help);
            store.bind_flag(&path, flags.lookup(&path))
        }
    }
}
