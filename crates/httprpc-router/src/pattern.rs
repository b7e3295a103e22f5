//! Route pattern compiler.
//!
//! Turns a registered path such as `/orgs/:org_id/users/:user_id` into a
//! [`RoutePattern`]: the literal/parameter segment list, the ordered
//! parameter names, and a canonical *shape* in which every parameter segment
//! is collapsed to a single `:` marker.
//!
//! Two patterns with the same shape but different concrete paths cannot be
//! told apart by position and are reported as ambiguous by the dispatch
//! table builder.

use crate::error::RouteError;
use crate::params::Params;

/// Marker that introduces a parameter segment and stands in for one in shapes.
pub const PARAM_MARKER: char = ':';

/// A single compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches exactly this text.
    Literal(String),
    /// Captures one non-empty segment under this name.
    Param(String),
}

/// A compiled route path.
///
/// # Example
///
/// ```rust
/// use httprpc_router::RoutePattern;
///
/// let pattern = RoutePattern::parse("/users/:user_id/posts").unwrap();
/// assert_eq!(pattern.shape(), "/users/:/posts");
/// assert_eq!(pattern.param_names(), ["user_id"]);
/// assert!(!pattern.is_static());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    path: String,
    segments: Vec<Segment>,
    params: Vec<String>,
    shape: String,
}

impl RoutePattern {
    /// Compiles `path`, validating parameter syntax.
    ///
    /// # Errors
    ///
    /// Fails on brace syntax, an empty or non snake_case parameter name, or a
    /// parameter name used twice.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let mut segments = Vec::new();
        let mut params: Vec<String> = Vec::new();
        let mut shape = Vec::new();

        for raw in path.split('/') {
            if raw.contains('{') || raw.contains('}') {
                return Err(RouteError::BraceSyntax {
                    path: path.to_string(),
                    segment: raw.to_string(),
                });
            }

            let Some(name) = raw.strip_prefix(PARAM_MARKER) else {
                segments.push(Segment::Literal(raw.to_string()));
                shape.push(raw.to_string());
                continue;
            };

            if name.is_empty() {
                return Err(RouteError::EmptyParamName {
                    path: path.to_string(),
                    segment: raw.to_string(),
                });
            }
            if !is_snake_case(name) {
                return Err(RouteError::InvalidParamName {
                    path: path.to_string(),
                    segment: raw.to_string(),
                });
            }
            if params.iter().any(|p| p == name) {
                return Err(RouteError::DuplicateParam {
                    path: path.to_string(),
                    name: name.to_string(),
                });
            }

            params.push(name.to_string());
            segments.push(Segment::Param(name.to_string()));
            shape.push(PARAM_MARKER.to_string());
        }

        Ok(Self {
            path: path.to_string(),
            segments,
            params,
            shape: shape.join("/"),
        })
    }

    /// The concrete path as registered.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The canonical shape, with parameter segments collapsed to `:`.
    #[must_use]
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Parameter names in the order they appear.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.params
    }

    /// Returns true if the pattern declares `name`.
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    /// The compiled segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true if the path has no parameter segments.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.params.is_empty()
    }

    /// Matches an incoming path, capturing parameters positionally.
    ///
    /// The segment count must be equal and every literal must match exactly.
    /// A parameter never captures an empty segment.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        self.captures_segments(path.split('/'))
    }

    /// Like [`captures`](Self::captures), over a path already split on `/`.
    ///
    /// The first segment is the empty one before the leading slash. A
    /// segment may itself contain `/` when it was percent-encoded on the
    /// wire.
    #[must_use]
    pub fn captures_segments<'s, I>(&self, segments: I) -> Option<Params>
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut incoming = segments.into_iter();
        let mut params = Params::with_capacity(self.params.len());

        for segment in &self.segments {
            let actual = incoming.next()?;
            match segment {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    params.push(name.clone(), actual);
                }
            }
        }

        if incoming.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Returns true for lower snake_case identifiers: `[a-z][a-z0-9_]*`.
#[must_use]
pub fn is_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_static_path() {
        let pattern = RoutePattern::parse("/v1/ping").unwrap();
        assert!(pattern.is_static());
        assert_eq!(pattern.shape(), "/v1/ping");
        assert_eq!(pattern.path(), "/v1/ping");
        assert!(pattern.param_names().is_empty());
    }

    #[test]
    fn test_param_names_in_order() {
        let pattern = RoutePattern::parse("/orgs/:org_id/users/:user_id").unwrap();
        assert_eq!(pattern.param_names(), ["org_id", "user_id"]);
        assert_eq!(pattern.shape(), "/orgs/:/users/:");
        assert!(pattern.has_param("org_id"));
        assert!(!pattern.has_param("id"));
    }

    #[test]
    fn test_brace_syntax_rejected() {
        let err = RoutePattern::parse("/users/{id}").unwrap_err();
        assert!(matches!(err, RouteError::BraceSyntax { ref segment, .. } if segment == "{id}"));
        assert!(err.to_string().contains("use :name"));
    }

    #[test]
    fn test_non_snake_case_rejected() {
        let err = RoutePattern::parse("/users/:UserID").unwrap_err();
        assert!(err.to_string().contains("snake_case"));
        assert!(err.to_string().contains(":UserID"));

        assert!(RoutePattern::parse("/users/:1st").is_err());
        assert!(RoutePattern::parse("/users/:user-id").is_err());
    }

    #[test]
    fn test_empty_param_rejected() {
        let err = RoutePattern::parse("/users/:").unwrap_err();
        assert!(matches!(err, RouteError::EmptyParamName { .. }));
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let err = RoutePattern::parse("/users/:id/:id").unwrap_err();
        assert!(err.to_string().contains("duplicate path param"));
    }

    #[test]
    fn test_captures_positionally() {
        let pattern = RoutePattern::parse("/users/:id/posts/:post_id").unwrap();
        let params = pattern.captures("/users/42/posts/7").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("post_id"), Some("7"));
    }

    #[test]
    fn test_captures_require_same_segment_count() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        assert!(pattern.captures("/users").is_none());
        assert!(pattern.captures("/users/42/extra").is_none());
        assert!(pattern.captures("/accounts/42").is_none());
    }

    #[test]
    fn test_param_never_captures_empty_segment() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        assert!(pattern.captures("/users/").is_none());
    }

    #[test]
    fn test_is_snake_case() {
        assert!(is_snake_case("id"));
        assert!(is_snake_case("user_id2"));
        assert!(!is_snake_case("_id"));
        assert!(!is_snake_case("Id"));
        assert!(!is_snake_case(""));
    }

    proptest! {
        #[test]
        fn prop_shape_ignores_param_names(
            prefix in "[a-z]{1,8}",
            a in "[a-z][a-z0-9_]{0,8}",
            b in "[a-z][a-z0-9_]{0,8}",
        ) {
            let left = RoutePattern::parse(&format!("/{prefix}/:{a}")).unwrap();
            let right = RoutePattern::parse(&format!("/{prefix}/:{b}")).unwrap();
            prop_assert_eq!(left.shape(), right.shape());
        }

        #[test]
        fn prop_captured_value_round_trips(value in "[A-Za-z0-9_.~-]{1,16}") {
            let pattern = RoutePattern::parse("/items/:item_id").unwrap();
            let params = pattern.captures(&format!("/items/{value}")).unwrap();
            prop_assert_eq!(params.get("item_id"), Some(value.as_str()));
        }
    }
}
