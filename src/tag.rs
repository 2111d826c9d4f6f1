//! Field tag resolution: visible name, help comment, skip.
//!
//! Each field carries up to two tags. The primary flag tag always wins over the
//! fallback bind tag, even when the primary one only renames the field. A tag
//! is one of:
//!
//! - `-` skips the field and everything below it;
//! - `name` uses `name` as the path segment;
//! - `name; help comment` does the same and adds help text for the flag.

use crate::schema::Field;

/// The tag value that excludes a field from binding.
pub const SKIP_MARKER: &str = "-";

const COMMENT_SEPARATOR: char = ';';

/// Outcome of resolving a field's tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// Bind under `name`, with an optional help comment.
    Named {
        name: String,
        comment: Option<String>,
    },
    /// Excluded from binding, along with all descendants.
    Skipped,
    /// No usable tag; derive the name from the declared field name.
    Inherit,
}

/// Resolve the tags of `field` into a [`Tag`].
///
/// Never returns [`Tag::Inherit`] for a tag with a non-empty name part.
pub fn resolve(field: &Field) -> Tag {
    let fallback = non_blank(field.bind_tag);
    let Some(raw) = non_blank(field.flag_tag).or(fallback) else {
        return Tag::Inherit;
    };

    if raw == SKIP_MARKER {
        return Tag::Skipped;
    }

    let (name, comment) = split(raw);
    let comment = comment.filter(|c| !c.is_empty()).map(str::to_string);
    if !name.is_empty() {
        return Tag::Named {
            name: name.to_string(),
            comment,
        };
    }

    // "; help only" keeps the help; the name comes from the bind tag or the field.
    let name = fallback
        .filter(|t| *t != SKIP_MARKER)
        .map(|t| split(t).0)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| sanitize_field_name(field.name));
    Tag::Named { name, comment }
}

fn split(tag: &str) -> (&str, Option<&str>) {
    match tag.split_once(COMMENT_SEPARATOR) {
        Some((name, comment)) => (name.trim(), Some(comment.trim())),
        None => (tag, None),
    }
}

/// Resolve `field` into its visible name and help text, or `None` if skipped.
///
/// Help falls back to the field's doc comment when the tag carries none.
pub fn visible_name(field: &Field) -> Option<(String, String)> {
    let (name, comment) = match resolve(field) {
        Tag::Skipped => return None,
        Tag::Inherit => (sanitize_field_name(field.name), None),
        Tag::Named { name, comment } => (name, comment),
    };
    let help = comment
        .or_else(|| field.doc.map(str::to_string))
        .unwrap_or_default();
    Some((name, help))
}

/// Turn a declared field name into a path segment.
///
/// Dashes and spaces become `_`; a dot becomes `__` so it can never be confused
/// with the path separator.
pub fn sanitize_field_name(name: &str) -> String {
    name.replace('-', "_").replace('.', "__").replace(' ', "_")
}

fn non_blank(tag: Option<&str>) -> Option<&str> {
    tag.map(|t| t.trim_matches([' ', '\t']))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Kind;

    fn field(flag: Option<&'static str>, bind: Option<&'static str>) -> Field {
        Field {
            name: "field",
            flag_tag: flag,
            bind_tag: bind,
            doc: None,
            kind: Kind::I32,
        }
    }

    #[test]
    fn no_tags_inherits() {
        assert_eq!(resolve(&field(None, None)), Tag::Inherit);
    }

    #[test]
    fn whitespace_tag_is_empty() {
        assert_eq!(resolve(&field(Some("  \t"), None)), Tag::Inherit);
    }

    #[test]
    fn skip_marker_on_flag_tag() {
        assert_eq!(resolve(&field(Some("-"), None)), Tag::Skipped);
    }

    #[test]
    fn skip_marker_on_bind_tag() {
        assert_eq!(resolve(&field(None, Some(" - "))), Tag::Skipped);
    }

    #[test]
    fn flag_tag_wins_over_bind_skip() {
        let tag = resolve(&field(Some("keep"), Some("-")));
        assert_eq!(
            tag,
            Tag::Named {
                name: "keep".into(),
                comment: None
            }
        );
    }

    #[test]
    fn flag_skip_wins_over_bind_name() {
        assert_eq!(resolve(&field(Some("-"), Some("name"))), Tag::Skipped);
    }

    #[test]
    fn blank_flag_tag_falls_back_to_bind_tag() {
        let tag = resolve(&field(Some(" "), Some("other")));
        assert_eq!(
            tag,
            Tag::Named {
                name: "other".into(),
                comment: None
            }
        );
    }

    #[test]
    fn name_and_comment_are_trimmed() {
        let tag = resolve(&field(Some("a; a simple integer "), None));
        assert_eq!(
            tag,
            Tag::Named {
                name: "a".into(),
                comment: Some("a simple integer".into())
            }
        );
    }

    #[test]
    fn empty_name_part_uses_field_name() {
        let tag = resolve(&field(Some("; only help"), None));
        assert_eq!(
            tag,
            Tag::Named {
                name: "field".into(),
                comment: Some("only help".into())
            }
        );
    }

    #[test]
    fn empty_name_part_prefers_bind_tag_name() {
        let tag = resolve(&field(Some(";chatty output"), Some("verbose-mode")));
        assert_eq!(
            tag,
            Tag::Named {
                name: "verbose-mode".into(),
                comment: Some("chatty output".into())
            }
        );
    }

    #[test]
    fn help_only_flag_tag_overrides_bind_skip() {
        let tag = resolve(&field(Some("; still bound"), Some("-")));
        assert_eq!(
            tag,
            Tag::Named {
                name: "field".into(),
                comment: Some("still bound".into())
            }
        );
    }

    #[test]
    fn sanitize_replaces_separators() {
        assert_eq!(sanitize_field_name("favorite-color"), "favorite_color");
        assert_eq!(sanitize_field_name("a.b"), "a__b");
        assert_eq!(sanitize_field_name("two words"), "two_words");
    }

    #[test]
    fn visible_name_uses_doc_when_tag_has_no_comment() {
        let mut f = field(None, None);
        f.doc = Some("from docs");
        assert_eq!(
            visible_name(&f),
            Some(("field".to_string(), "from docs".to_string()))
        );
    }

    #[test]
    fn visible_name_prefers_tag_comment() {
        let mut f = field(Some("x; from tag"), None);
        f.doc = Some("from docs");
        assert_eq!(
            visible_name(&f),
            Some(("x".to_string(), "from tag".to_string()))
        );
    }

    #[test]
    fn visible_name_none_when_skipped() {
        assert_eq!(visible_name(&field(None, Some("-"))), None);
    }
}
