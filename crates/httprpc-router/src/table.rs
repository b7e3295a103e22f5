//! Dispatch table: static paths plus compiled parameterized patterns.
//!
//! The table is assembled by a [`TableBuilder`] and frozen into an immutable
//! [`DispatchTable`]. Building detects duplicate method+path registrations
//! and ambiguous pattern shapes; any conflict aborts the whole build.
//!
//! # Lookup order
//!
//! 1. Exact match in the static table.
//! 2. Otherwise the first compiled pattern, in registration order, whose
//!    segment count and literal segments match.
//!
//! A matched path with no handler for the request method yields
//! [`Lookup::MethodNotAllowed`] with the precomputed `Allow` value.

use std::collections::HashMap;

use http::Method;

use crate::error::RouteError;
use crate::method_set::{InsertError, MethodSet};
use crate::params::Params;
use crate::pattern::RoutePattern;

/// A compiled pattern and the handlers registered on its concrete path.
#[derive(Debug, Clone)]
struct PatternRoute<H> {
    pattern: RoutePattern,
    methods: MethodSet<H>,
}

/// Result of looking up a request in a [`DispatchTable`].
#[derive(Debug)]
pub enum Lookup<'a, H> {
    /// A handler exists for the method and path.
    Found {
        /// The matched handler.
        handler: &'a H,
        /// Values captured from parameter segments.
        params: Params,
        /// The registered path that matched.
        route: &'a str,
    },
    /// The path matched but the method is not registered for it.
    MethodNotAllowed {
        /// Sorted, comma-separated registered methods.
        allow: &'a str,
    },
    /// No path matched.
    NotFound,
}

/// Mutable accumulator for a [`DispatchTable`].
///
/// # Example
///
/// ```rust
/// use httprpc_router::{Lookup, TableBuilder};
/// use http::Method;
///
/// let mut builder = TableBuilder::new();
/// builder.insert(Method::GET, "/users", "list").unwrap();
/// builder.insert(Method::GET, "/users/:id", "get").unwrap();
/// let table = builder.build();
///
/// match table.lookup(&Method::GET, "/users/42") {
///     Lookup::Found { handler, params, .. } => {
///         assert_eq!(*handler, "get");
///         assert_eq!(params.get("id"), Some("42"));
///     }
///     _ => panic!("expected a match"),
/// }
/// ```
#[derive(Debug)]
pub struct TableBuilder<H> {
    statics: HashMap<String, MethodSet<H>>,
    patterns: Vec<PatternRoute<H>>,
    shapes: HashMap<String, usize>,
}

impl<H> Default for TableBuilder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> TableBuilder<H> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            statics: HashMap::new(),
            patterns: Vec::new(),
            shapes: HashMap::new(),
        }
    }

    /// Compiles `path` and registers `handler` under `method`.
    ///
    /// # Errors
    ///
    /// Returns the compiler's syntax error, or a conflict error as described
    /// in [`insert_pattern`](Self::insert_pattern).
    pub fn insert(&mut self, method: Method, path: &str, handler: H) -> Result<(), RouteError> {
        let pattern = RoutePattern::parse(path)?;
        self.insert_pattern(method, pattern, handler)
    }

    /// Registers `handler` for an already compiled pattern.
    ///
    /// # Errors
    ///
    /// - [`RouteError::DuplicateRoute`] if the method+path already exists
    /// - [`RouteError::AmbiguousRoute`] if another concrete path shares the
    ///   pattern's shape
    /// - [`RouteError::UnsupportedMethod`] for methods outside the verb set
    pub fn insert_pattern(
        &mut self,
        method: Method,
        pattern: RoutePattern,
        handler: H,
    ) -> Result<(), RouteError> {
        let methods = if pattern.is_static() {
            self.statics.entry(pattern.path().to_string()).or_default()
        } else if let Some(&index) = self.shapes.get(pattern.shape()) {
            let existing = &mut self.patterns[index];
            if existing.pattern.path() != pattern.path() {
                return Err(RouteError::AmbiguousRoute {
                    existing: existing.pattern.path().to_string(),
                    path: pattern.path().to_string(),
                    shape: pattern.shape().to_string(),
                });
            }
            &mut existing.methods
        } else {
            self.shapes
                .insert(pattern.shape().to_string(), self.patterns.len());
            self.patterns.push(PatternRoute {
                pattern: pattern.clone(),
                methods: MethodSet::new(),
            });
            let last = self.patterns.len() - 1;
            &mut self.patterns[last].methods
        };

        methods.insert(&method, handler).map_err(|err| match err {
            InsertError::Occupied => RouteError::DuplicateRoute {
                method: method.to_string(),
                path: pattern.path().to_string(),
            },
            InsertError::Unsupported => RouteError::UnsupportedMethod {
                method: method.to_string(),
                path: pattern.path().to_string(),
            },
        })
    }

    /// Freezes the table, precomputing every bucket's `Allow` value.
    #[must_use]
    pub fn build(mut self) -> DispatchTable<H> {
        for methods in self.statics.values_mut() {
            methods.freeze();
        }
        for route in &mut self.patterns {
            route.methods.freeze();
        }
        DispatchTable {
            statics: self.statics,
            patterns: self.patterns,
        }
    }
}

/// Immutable route table shared by all requests.
#[derive(Debug, Clone)]
pub struct DispatchTable<H> {
    statics: HashMap<String, MethodSet<H>>,
    patterns: Vec<PatternRoute<H>>,
}

impl<H> DispatchTable<H> {
    /// Resolves `method` and `path` to a handler.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, H> {
        if let Some((route, methods)) = self.statics.get_key_value(path) {
            return Self::select(methods, method, Params::new(), route);
        }

        for route in &self.patterns {
            if let Some(params) = route.pattern.captures(path) {
                return Self::select(&route.methods, method, params, route.pattern.path());
            }
        }

        Lookup::NotFound
    }

    /// Resolves `method` against a path already split on `/` and decoded.
    ///
    /// Static routes are only considered when no segment contains a `/`, so
    /// an encoded slash can only ever be captured by a parameter.
    #[must_use]
    pub fn lookup_segments(&self, method: &Method, segments: &[&str]) -> Lookup<'_, H> {
        if !segments.iter().any(|segment| segment.contains('/')) {
            let path = segments.join("/");
            if let Some((route, methods)) = self.statics.get_key_value(path.as_str()) {
                return Self::select(methods, method, Params::new(), route);
            }
        }

        for route in &self.patterns {
            if let Some(params) = route.pattern.captures_segments(segments.iter().copied()) {
                return Self::select(&route.methods, method, params, route.pattern.path());
            }
        }

        Lookup::NotFound
    }

    fn select<'a>(
        methods: &'a MethodSet<H>,
        method: &Method,
        params: Params,
        route: &'a str,
    ) -> Lookup<'a, H> {
        match methods.get(method) {
            Some(handler) => Lookup::Found {
                handler,
                params,
                route,
            },
            None => Lookup::MethodNotAllowed {
                allow: methods.allow(),
            },
        }
    }

    /// Number of static path buckets.
    #[must_use]
    pub fn static_paths(&self) -> usize {
        self.statics.len()
    }

    /// Number of compiled parameterized patterns.
    #[must_use]
    pub fn pattern_paths(&self) -> usize {
        self.patterns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn found<H: Copy>(lookup: Lookup<'_, H>) -> (H, Params) {
        match lookup {
            Lookup::Found {
                handler, params, ..
            } => (*handler, params),
            other => panic!("expected a match, got {other:?}", other = kind(&other)),
        }
    }

    fn kind<H>(lookup: &Lookup<'_, H>) -> &'static str {
        match lookup {
            Lookup::Found { .. } => "found",
            Lookup::MethodNotAllowed { .. } => "method not allowed",
            Lookup::NotFound => "not found",
        }
    }

    #[test]
    fn test_static_lookup() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/ping", 1).unwrap();
        builder.insert(Method::POST, "/ping", 2).unwrap();
        let table = builder.build();

        assert_eq!(found(table.lookup(&Method::GET, "/ping")).0, 1);
        assert_eq!(found(table.lookup(&Method::POST, "/ping")).0, 2);
        assert_eq!(table.static_paths(), 1);
        assert_eq!(table.pattern_paths(), 0);
    }

    #[test]
    fn test_pattern_lookup_captures_params() {
        let mut builder = TableBuilder::new();
        builder
            .insert(Method::GET, "/orgs/:org_id/users/:user_id", 7)
            .unwrap();
        let table = builder.build();

        let (handler, params) = found(table.lookup(&Method::GET, "/orgs/acme/users/42"));
        assert_eq!(handler, 7);
        assert_eq!(params.get("org_id"), Some("acme"));
        assert_eq!(params.get("user_id"), Some("42"));
    }

    #[test]
    fn test_static_wins_over_pattern() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/users/:id", "by_id").unwrap();
        builder.insert(Method::GET, "/users/me", "me").unwrap();
        let table = builder.build();

        assert_eq!(found(table.lookup(&Method::GET, "/users/me")).0, "me");
        assert_eq!(found(table.lookup(&Method::GET, "/users/9")).0, "by_id");
    }

    #[test]
    fn test_encoded_slash_only_matches_a_param() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/files/a/b", "static").unwrap();
        builder.insert(Method::GET, "/files/:name", "by_name").unwrap();
        let table = builder.build();

        let (handler, params) = found(table.lookup_segments(&Method::GET, &["", "files", "a/b"]));
        assert_eq!(handler, "by_name");
        assert_eq!(params.get("name"), Some("a/b"));

        let (handler, _) = found(table.lookup_segments(&Method::GET, &["", "files", "a", "b"]));
        assert_eq!(handler, "static");
    }

    #[test]
    fn test_patterns_scan_in_registration_order() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/:section/latest", "first").unwrap();
        builder.insert(Method::GET, "/news/:slug", "second").unwrap();
        let table = builder.build();

        assert_eq!(found(table.lookup(&Method::GET, "/news/latest")).0, "first");
        assert_eq!(found(table.lookup(&Method::GET, "/news/today")).0, "second");
    }

    #[test]
    fn test_method_not_allowed_reports_sorted_allow() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::POST, "/items/:id", ()).unwrap();
        builder.insert(Method::DELETE, "/items/:id", ()).unwrap();
        builder.insert(Method::GET, "/items/:id", ()).unwrap();
        let table = builder.build();

        match table.lookup(&Method::PUT, "/items/3") {
            Lookup::MethodNotAllowed { allow } => assert_eq!(allow, "DELETE, GET, POST"),
            other => panic!("unexpected {}", kind(&other)),
        }
    }

    #[test]
    fn test_not_found() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/ping", ()).unwrap();
        let table = builder.build();

        assert!(matches!(table.lookup(&Method::GET, "/pong"), Lookup::NotFound));
        assert!(matches!(table.lookup(&Method::GET, "/ping/x"), Lookup::NotFound));
    }

    #[test]
    fn test_duplicate_static_route() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/ping", "first").unwrap();
        let err = builder.insert(Method::GET, "/ping", "second").unwrap_err();

        assert_eq!(
            err,
            RouteError::DuplicateRoute {
                method: "GET".into(),
                path: "/ping".into(),
            }
        );
        let table = builder.build();
        assert_eq!(found(table.lookup(&Method::GET, "/ping")).0, "first");
    }

    #[test]
    fn test_duplicate_pattern_route() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/users/:id", ()).unwrap();
        let err = builder.insert(Method::GET, "/users/:id", ()).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_ambiguous_route() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/users/:id", ()).unwrap();
        let err = builder
            .insert(Method::POST, "/users/:user_id", ())
            .unwrap_err();

        assert!(err.to_string().contains("ambiguous route"));
        assert!(matches!(
            err,
            RouteError::AmbiguousRoute { ref existing, ref shape, .. }
                if existing == "/users/:id" && shape == "/users/:"
        ));
    }

    #[test]
    fn test_same_pattern_different_methods_share_bucket() {
        let mut builder = TableBuilder::new();
        builder.insert(Method::GET, "/users/:id", 1).unwrap();
        builder.insert(Method::PATCH, "/users/:id", 2).unwrap();
        let table = builder.build();

        assert_eq!(table.pattern_paths(), 1);
        assert_eq!(found(table.lookup(&Method::PATCH, "/users/5")).0, 2);
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let mut builder = TableBuilder::new();
        let err = builder.insert(Method::TRACE, "/debug", ()).unwrap_err();
        assert!(matches!(err, RouteError::UnsupportedMethod { .. }));
    }

    proptest! {
        #[test]
        fn prop_duplicate_static_never_overwrites(
            segments in proptest::collection::vec("[a-z0-9]{1,6}", 1..4),
        ) {
            let path = format!("/{}", segments.join("/"));
            let mut builder = TableBuilder::new();
            builder.insert(Method::GET, &path, 1).unwrap();

            let is_duplicate = matches!(
                builder.insert(Method::GET, &path, 2),
                Err(RouteError::DuplicateRoute { .. })
            );
            prop_assert!(is_duplicate);

            let table = builder.build();
            prop_assert_eq!(found(table.lookup(&Method::GET, &path)).0, 1);
        }

        #[test]
        fn prop_differing_param_names_are_ambiguous(
            prefix in "[a-z]{1,6}",
            a in "[a-z][a-z0-9_]{0,6}",
            b in "[a-z][a-z0-9_]{0,6}",
        ) {
            prop_assume!(a != b);
            let mut builder = TableBuilder::new();
            builder.insert(Method::GET, &format!("/{prefix}/:{a}"), ()).unwrap();

            let is_ambiguous = matches!(
                builder.insert(Method::GET, &format!("/{prefix}/:{b}"), ()),
                Err(RouteError::AmbiguousRoute { .. })
            );
            prop_assert!(is_ambiguous);
        }
    }
}
