#[cfg(test)]
#[allow(non_snake_case, dead_code)]
pub mod test {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use crate::Schema;

    #[derive(Schema, Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct Simple {
        pub A: isize,
        pub B: String,
    }

    #[derive(Schema, Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct Nested {
        pub A: isize,
        pub B: String,
        pub C: NestedInner,
    }

    #[derive(Schema, Serialize, Deserialize, Debug, Default, PartialEq)]
    pub struct NestedInner {
        pub D: Vec<String>,
        pub E: Vec<isize>,
    }

    // -- Fixtures with skip markers ---------------------------------------------

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct NestedWithSkips {
        #[flag = "a; a simple integer"]
        a: isize,
        #[serde(skip)]
        b: String,
        c: SkipInner,
    }

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct SkipInner {
        d: Vec<String>,
        #[flag = "-"]
        e: Vec<isize>,
    }

    /// Skips only on the flag side; every field still decodes from a file.
    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct FileConfig {
        #[flag = "a; a simple integer"]
        pub a: isize,
        #[serde(skip)]
        pub b: String,
        pub c: FileInner,
    }

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct FileInner {
        pub d: Vec<String>,
        pub e: Vec<isize>,
    }

    // -- Kind dispatch fixtures ---------------------------------------------------

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct Widths {
        pub small: i16,
        pub usmall: u16,
        pub medium: i32,
        pub umedium: u32,
        pub large: i64,
        pub ularge: u64,
        pub native: usize,
        pub small_list: Vec<i16>,
        pub usmall_list: Vec<u16>,
        pub umedium_list: Vec<u32>,
        pub tiny: i8,
        pub ratio: f64,
        pub timeout: Duration,
    }

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    pub struct Timeouts {
        pub connect: Duration,
        pub retries: i64,
        pub backoff: Vec<Duration>,
    }

    // -- Serde-driven names ---------------------------------------------------------

    #[derive(Schema, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
    #[serde(rename_all = "lowercase")]
    pub enum Mode {
        #[default]
        Fast,
        Slow,
    }

    #[derive(Schema, Deserialize, Debug, Default, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    pub struct Preferences {
        /// Color used for highlights.
        pub favorite_color: String,
        #[serde(rename = "max")]
        pub max_items: u32,
        #[flag = "; chatty output"]
        pub verbose_mode: bool,
        pub mode: Mode,
    }

    #[test]
    fn derive_records_tags_and_docs() {
        use crate::schema::Kind;

        let Kind::Struct(fields) = Preferences::kind() else {
            panic!("expected a struct kind");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, ["favorite_color", "max_items", "verbose_mode", "mode"]);
        assert_eq!(fields[0].bind_tag, Some("favorite-color"));
        assert_eq!(fields[0].doc, Some("Color used for highlights."));
        assert_eq!(fields[1].bind_tag, Some("max"));
        assert_eq!(fields[2].flag_tag, Some("; chatty output"));
        assert_eq!(fields[3].kind, Kind::Other("enum"));
    }

    #[test]
    fn derive_marks_serde_skip() {
        use crate::schema::Kind;

        let Kind::Struct(fields) = NestedWithSkips::kind() else {
            panic!("expected a struct kind");
        };
        assert_eq!(fields[1].bind_tag, Some("-"));
        let Kind::Struct(inner) = &fields[2].kind else {
            panic!("expected a nested struct");
        };
        assert_eq!(inner[1].flag_tag, Some("-"));
    }
}
