//! Route compilation and table construction errors.

use thiserror::Error;

/// Errors raised while compiling a path or building the dispatch table.
///
/// All of these are registration-time failures: they abort table
/// construction entirely and never surface while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A segment used `{name}` instead of `:name`.
    #[error("invalid path {path}: segment {segment:?} uses braces; use :name for path params")]
    BraceSyntax {
        /// The full path being compiled.
        path: String,
        /// The offending segment.
        segment: String,
    },

    /// A `:` segment with no name after it.
    #[error("invalid path {path}: path param in segment {segment:?} must have a name")]
    EmptyParamName {
        /// The full path being compiled.
        path: String,
        /// The offending segment.
        segment: String,
    },

    /// A parameter name that is not lower snake_case.
    #[error("invalid path {path}: path param {segment:?} must be snake_case")]
    InvalidParamName {
        /// The full path being compiled.
        path: String,
        /// The offending segment.
        segment: String,
    },

    /// The same parameter name appears twice in one path.
    #[error("invalid path {path}: duplicate path param {name:?}")]
    DuplicateParam {
        /// The full path being compiled.
        path: String,
        /// The repeated parameter name.
        name: String,
    },

    /// The method is outside the supported verb set.
    #[error("unsupported method {method} for {path}")]
    UnsupportedMethod {
        /// The rejected method.
        method: String,
        /// The route path.
        path: String,
    },

    /// The same method and path were registered twice.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        /// The HTTP method.
        method: String,
        /// The route path.
        path: String,
    },

    /// Two parameterized paths share a shape but differ in parameter names.
    #[error("ambiguous route: {path} conflicts with {existing} (shape {shape})")]
    AmbiguousRoute {
        /// The path registered first.
        existing: String,
        /// The conflicting path.
        path: String,
        /// The canonical shape both compile to.
        shape: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_hints() {
        let brace = RouteError::BraceSyntax {
            path: "/users/{id}".into(),
            segment: "{id}".into(),
        };
        assert!(brace.to_string().contains("use :name"));

        let dup = RouteError::DuplicateRoute {
            method: "GET".into(),
            path: "/ping".into(),
        };
        assert_eq!(dup.to_string(), "duplicate route: GET /ping");

        let ambiguous = RouteError::AmbiguousRoute {
            existing: "/users/:id".into(),
            path: "/users/:user_id".into(),
            shape: "/users/:".into(),
        };
        assert!(ambiguous.to_string().starts_with("ambiguous route"));
    }
}
