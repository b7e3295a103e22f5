//! Per-type field tables.
//!
//! Query and metadata decoding need to know, for each field of a request or
//! metadata struct, its wire names and how to set it from strings. A type
//! provides this by implementing [`FieldBinder`], returning a [`FieldTable`]
//! built once and cached for the life of the process.
//!
//! # Wire names
//!
//! Each field is declared with its Rust-facing identifier (conventionally
//! the `PascalCase` name used in generated clients) and may carry tags:
//!
//! | Tag | Used by | Meaning |
//! |---|---|---|
//! | `query` | query decoding | explicit query parameter name |
//! | `json` | query decoding | serialized name, used when no `query` name |
//! | `path` | metadata decoding | path parameter name, must be snake_case |
//! | `header` | metadata decoding | header name |
//!
//! A tag value is `name[,option...]`. The value `-` skips the field for that
//! tag, and an empty name falls through to the next rule. Query decoding
//! resolves `query`, then `json`, then the snake_case form of the identifier.
//! The `omitempty` option on a header tag (or [`FieldTableBuilder::optional`])
//! makes the header optional.
//!
//! # Example
//!
//! ```rust
//! use httprpc_extract::{FieldBinder, FieldTable};
//! use std::sync::OnceLock;
//!
//! #[derive(Debug, Default)]
//! struct ListUsers {
//!     page_size: u32,
//!     cursor: Option<String>,
//!     internal: bool,
//! }
//!
//! impl FieldBinder for ListUsers {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         static TABLE: OnceLock<FieldTable<ListUsers>> = OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             FieldTable::<ListUsers>::builder("ListUsers")
//!                 .field("PageSize", |r| &mut r.page_size)
//!                 .field("Cursor", |r| &mut r.cursor).query("after")
//!                 .field("Internal", |r| &mut r.internal).skip()
//!                 .build()
//!         })
//!     }
//! }
//!
//! let table = ListUsers::field_table();
//! assert_eq!(table.fields()[0].query_name().as_deref(), Some("page_size"));
//! assert_eq!(table.fields()[1].query_name().as_deref(), Some("after"));
//! assert_eq!(table.fields()[2].query_name(), None);
//! ```

use crate::coerce::{CoercionError, FromWire};
use httprpc_core::Empty;

type Setter<T> = Box<dyn Fn(&mut T, &[String]) -> Result<(), CoercionError> + Send + Sync>;

/// Types whose fields can be bound from wire strings.
pub trait FieldBinder: Sized + 'static {
    /// The cached field table for this type.
    fn field_table() -> &'static FieldTable<Self>;
}

/// A parsed tag value such as `user_id,omitempty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    raw: String,
}

impl Tag {
    fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// True for the skip marker `-`.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.raw == "-"
    }

    /// The name part, trimmed. Empty when only options were given.
    #[must_use]
    pub fn name(&self) -> &str {
        self.raw.split(',').next().unwrap_or("").trim()
    }

    /// True if `option` follows the name.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.raw.split(',').skip(1).any(|o| o.trim() == option)
    }
}

/// One bindable field.
pub struct Field<T> {
    ident: &'static str,
    query: Option<Tag>,
    json: Option<Tag>,
    path: Option<Tag>,
    header: Option<Tag>,
    optional: bool,
    skipped: bool,
    embedded: bool,
    setter: Setter<T>,
}

impl<T> Field<T> {
    /// The declared identifier.
    #[must_use]
    pub const fn ident(&self) -> &'static str {
        self.ident
    }

    /// The `path` tag, if declared.
    #[must_use]
    pub const fn path_tag(&self) -> Option<&Tag> {
        self.path.as_ref()
    }

    /// The `header` tag, if declared.
    #[must_use]
    pub const fn header_tag(&self) -> Option<&Tag> {
        self.header.as_ref()
    }

    /// True if a missing header value is allowed.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional || self.header.as_ref().is_some_and(|t| t.has_option("omitempty"))
    }

    /// True if decoders ignore this field entirely.
    ///
    /// Skipped and embedded fields are never bound; embedded structs are not
    /// flattened.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.skipped || self.embedded
    }

    /// True if the field was declared as an embedded struct.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// The query parameter name, or `None` if the field is not decoded from
    /// the query string.
    #[must_use]
    pub fn query_name(&self) -> Option<String> {
        if self.is_ignored() {
            return None;
        }
        for tag in [&self.query, &self.json].into_iter().flatten() {
            if tag.is_skip() {
                return None;
            }
            if !tag.name().is_empty() {
                return Some(tag.name().to_string());
            }
        }
        let fallback = to_snake_case(self.ident);
        if fallback.is_empty() {
            return Some(self.ident.to_string());
        }
        Some(fallback)
    }

    /// Sets the field on `target` from `values`.
    ///
    /// # Errors
    ///
    /// Returns the coercion failure for the field's type.
    pub fn set(&self, target: &mut T, values: &[String]) -> Result<(), CoercionError> {
        (self.setter)(target, values)
    }
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("ident", &self.ident)
            .field("query", &self.query)
            .field("json", &self.json)
            .field("path", &self.path)
            .field("header", &self.header)
            .field("optional", &self.optional)
            .field("skipped", &self.skipped)
            .field("embedded", &self.embedded)
            .finish_non_exhaustive()
    }
}

/// The field configuration of one type.
#[derive(Debug)]
pub struct FieldTable<T> {
    owner: &'static str,
    fields: Vec<Field<T>>,
}

impl<T: 'static> FieldTable<T> {
    /// Starts a table for the type named `owner`.
    ///
    /// Name the target type when calling, as in
    /// `FieldTable::<Self>::builder("Owner")`, so the field accessors can be
    /// checked against it.
    #[must_use]
    pub fn builder(owner: &'static str) -> FieldTableBuilder<T> {
        FieldTableBuilder {
            table: Self {
                owner,
                fields: Vec::new(),
            },
        }
    }

    /// A table without fields.
    #[must_use]
    pub fn empty(owner: &'static str) -> Self {
        Self {
            owner,
            fields: Vec::new(),
        }
    }

    /// The type name used in error messages.
    #[must_use]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }

    /// The declared fields, in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }
}

/// Builder for a [`FieldTable`].
///
/// Tag methods apply to the most recently added field.
#[derive(Debug)]
pub struct FieldTableBuilder<T> {
    table: FieldTable<T>,
}

impl<T: 'static> FieldTableBuilder<T> {
    /// Adds a field bound through `accessor`.
    #[must_use]
    pub fn field<V>(mut self, ident: &'static str, accessor: fn(&mut T) -> &mut V) -> Self
    where
        V: FromWire + 'static,
    {
        self.table.fields.push(Field {
            ident,
            query: None,
            json: None,
            path: None,
            header: None,
            optional: false,
            skipped: false,
            embedded: false,
            setter: Box::new(move |target, values| {
                *accessor(target) = V::from_wire(values)?;
                Ok(())
            }),
        });
        self
    }

    /// Declares an embedded struct field. It is skipped by every decoder.
    #[must_use]
    pub fn embedded(mut self, ident: &'static str) -> Self {
        self.table.fields.push(Field {
            ident,
            query: None,
            json: None,
            path: None,
            header: None,
            optional: false,
            skipped: false,
            embedded: true,
            setter: Box::new(|_, _| Ok(())),
        });
        self
    }

    fn last(&mut self, apply: impl FnOnce(&mut Field<T>)) {
        if let Some(field) = self.table.fields.last_mut() {
            apply(field);
        }
    }

    /// Sets the `query` tag.
    #[must_use]
    pub fn query(mut self, tag: &str) -> Self {
        self.last(|f| f.query = Some(Tag::new(tag)));
        self
    }

    /// Sets the `json` tag.
    #[must_use]
    pub fn json(mut self, tag: &str) -> Self {
        self.last(|f| f.json = Some(Tag::new(tag)));
        self
    }

    /// Sets the `path` tag.
    #[must_use]
    pub fn path(mut self, tag: &str) -> Self {
        self.last(|f| f.path = Some(Tag::new(tag)));
        self
    }

    /// Sets the `header` tag.
    #[must_use]
    pub fn header(mut self, tag: &str) -> Self {
        self.last(|f| f.header = Some(Tag::new(tag)));
        self
    }

    /// Marks the header as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.last(|f| f.optional = true);
        self
    }

    /// Removes the field from every decoder.
    #[must_use]
    pub fn skip(mut self) -> Self {
        self.last(|f| f.skipped = true);
        self
    }

    /// Finishes the table.
    #[must_use]
    pub fn build(self) -> FieldTable<T> {
        self.table
    }
}

impl FieldBinder for () {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: FieldTable<()> = FieldTable {
            owner: "()",
            fields: Vec::new(),
        };
        &TABLE
    }
}

impl FieldBinder for Empty {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: FieldTable<Empty> = FieldTable {
            owner: "Empty",
            fields: Vec::new(),
        };
        &TABLE
    }
}

/// Converts an identifier to snake_case.
///
/// An underscore is inserted before an uppercase letter that follows a
/// lowercase letter or digit, or that starts a new word inside an acronym
/// (`HTTPServer` becomes `http_server`). `-`, `_` and spaces separate words.
#[must_use]
pub fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | ' ') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            let acronym_end =
                prev.is_some_and(char::is_uppercase) && next.is_some_and(char::is_lowercase);
            if (after_lower || acronym_end) && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    #[derive(Debug, Default)]
    struct Search {
        query_text: String,
        limit: u32,
        tags: Vec<String>,
        hidden: bool,
        internal: bool,
    }

    impl FieldBinder for Search {
        fn field_table() -> &'static FieldTable<Self> {
            static TABLE: OnceLock<FieldTable<Search>> = OnceLock::new();
            TABLE.get_or_init(|| {
                FieldTable::<Search>::builder("Search")
                    .field("QueryText", |s| &mut s.query_text).query("q")
                    .field("Limit", |s| &mut s.limit).json("max,omitempty")
                    .field("Tags", |s| &mut s.tags).json("")
                    .field("Hidden", |s| &mut s.hidden).json("-")
                    .field("Internal", |s| &mut s.internal).skip()
                    .embedded("Paging")
                    .build()
            })
        }
    }

    fn names() -> Vec<Option<String>> {
        Search::field_table()
            .fields()
            .iter()
            .map(Field::query_name)
            .collect()
    }

    #[test]
    fn test_query_name_priority() {
        let names = names();
        assert_eq!(names[0].as_deref(), Some("q"));
        assert_eq!(names[1].as_deref(), Some("max"));
        assert_eq!(names[2].as_deref(), Some("tags"));
        assert_eq!(names[3], None);
        assert_eq!(names[4], None);
        assert_eq!(names[5], None);
    }

    #[test]
    fn test_query_tag_skip_wins_over_json() {
        let table: FieldTable<Search> = FieldTable::<Search>::builder("Search")
            .field("Limit", |s| &mut s.limit)
            .query("-")
            .json("limit")
            .build();
        assert_eq!(table.fields()[0].query_name(), None);
    }

    #[test]
    fn test_setter_coerces() {
        let table = Search::field_table();
        let mut search = Search::default();
        table.fields()[1].set(&mut search, &["25".to_string()]).unwrap();
        table.fields()[2]
            .set(&mut search, &["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(search.limit, 25);
        assert_eq!(search.tags, vec!["a", "b"]);
        assert!(table.fields()[1].set(&mut search, &["x".to_string()]).is_err());
    }

    #[test]
    fn test_embedded_fields_are_ignored() {
        let table = Search::field_table();
        let paging = &table.fields()[5];
        assert!(paging.is_embedded());
        assert!(paging.is_ignored());
    }

    #[test]
    fn test_tag_parsing() {
        let tag = Tag::new("X-Trace-Id, omitempty");
        assert_eq!(tag.name(), "X-Trace-Id");
        assert!(tag.has_option("omitempty"));
        assert!(!tag.is_skip());
        assert!(Tag::new("-").is_skip());
        assert_eq!(Tag::new(",omitempty").name(), "");
    }

    #[test]
    fn test_unit_tables_are_empty() {
        assert!(<()>::field_table().fields().is_empty());
        assert_eq!(Empty::field_table().owner(), "Empty");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("UserID"), "user_id");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("PageSize"), "page_size");
        assert_eq!(to_snake_case("page_size"), "page_size");
        assert_eq!(to_snake_case("Version2Name"), "version2_name");
        assert_eq!(to_snake_case("Created At"), "created_at");
        assert_eq!(to_snake_case("kebab-case"), "kebab_case");
        assert_eq!(to_snake_case("_Leading"), "leading");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case(""), "");
    }
}
