//! Dotted-key helpers over `toml::Table` layers.
//!
//! The store keeps each source as a sparse nested table. Flag paths like
//! `database.url` address into those tables; layers are combined with
//! [`deep_merge`] so a higher layer only replaces the keys it actually holds.

use toml::{Table, Value};

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(Value::Table(base_tbl)), Value::Table(overlay_tbl)) => {
                base.insert(key, Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}

/// Insert `value` at a dotted `path`, creating intermediate tables.
///
/// A scalar sitting where an intermediate table is needed is replaced, so the
/// deeper key always lands.
pub fn insert_path(table: &mut Table, path: &str, value: Value) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().unwrap_or_default();
    let mut current = table;
    for segment in segments {
        let entry = current
            .entry(segment)
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(leaf.to_string(), value);
}

/// Look up the value at a dotted `path`.
pub fn lookup_path<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = table.get(first)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Mutable variant of [`lookup_path`].
pub fn lookup_path_mut<'a>(table: &'a mut Table, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = table.get_mut(first)?;
    for segment in segments {
        current = current.as_table_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Collect the dotted paths of every non-table value, in table order.
pub fn leaf_paths(table: &Table) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(table, "", &mut paths);
    paths
}

fn collect_leaves(table: &Table, prefix: &str, paths: &mut Vec<String>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) => collect_leaves(sub, &dotted, paths),
            _ => paths.push(dotted),
        }
    }
}
