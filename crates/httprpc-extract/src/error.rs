//! Decode error types.
//!
//! Every failure while turning a request into typed values is a
//! [`DecodeError`]. Decode errors are client errors: they always map to
//! `400 Bad Request`, whatever the underlying cause.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Where the value being decoded came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSource {
    /// The request body.
    Body,
    /// The URL query string.
    Query,
    /// A path parameter.
    Path,
    /// A request header.
    Header,
}

impl fmt::Display for DecodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Query => write!(f, "query"),
            Self::Path => write!(f, "path"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Error that occurs while decoding a request.
///
/// # Example
///
/// ```rust
/// use httprpc_extract::{DecodeError, DecodeSource};
/// use http::StatusCode;
///
/// let err = DecodeError::missing(DecodeSource::Header, "X-Tenant");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "missing header \"X-Tenant\"");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DecodeError {
    decode_source: DecodeSource,
    field: Option<String>,
    message: String,
}

impl DecodeError {
    /// A required path parameter or header is absent.
    #[must_use]
    pub fn missing(source: DecodeSource, name: impl Into<String>) -> Self {
        let name = name.into();
        let message = match source {
            DecodeSource::Path => format!("missing path param {name:?}"),
            DecodeSource::Header => format!("missing header {name:?}"),
            other => format!("missing {other} value {name:?}"),
        };
        Self {
            decode_source: source,
            field: Some(name),
            message,
        }
    }

    /// A value for `field` was present but could not be coerced.
    #[must_use]
    pub fn invalid(source: DecodeSource, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            decode_source: source,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// The input as a whole could not be parsed.
    #[must_use]
    pub fn malformed(source: DecodeSource, message: impl Into<String>) -> Self {
        Self {
            decode_source: source,
            field: None,
            message: message.into(),
        }
    }

    /// Where the failing value came from.
    #[must_use]
    pub const fn decode_source(&self) -> DecodeSource {
        self.decode_source
    }

    /// The wire name of the failing field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Always `400 Bad Request`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_param() {
        let err = DecodeError::missing(DecodeSource::Path, "user_id");
        assert_eq!(err.decode_source(), DecodeSource::Path);
        assert_eq!(err.field(), Some("user_id"));
        assert_eq!(err.to_string(), "missing path param \"user_id\"");
    }

    #[test]
    fn test_invalid_value() {
        let err = DecodeError::invalid(
            DecodeSource::Query,
            "limit",
            "decode query limit: parse int: invalid digit found in string",
        );
        assert_eq!(err.field(), Some("limit"));
        assert!(err.to_string().starts_with("decode query limit"));
    }

    #[test]
    fn test_every_kind_is_bad_request() {
        let errors = [
            DecodeError::missing(DecodeSource::Header, "x"),
            DecodeError::invalid(DecodeSource::Path, "id", "bad"),
            DecodeError::malformed(DecodeSource::Body, "decode request: EOF"),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_decode_source_display() {
        assert_eq!(DecodeSource::Body.to_string(), "body");
        assert_eq!(DecodeSource::Query.to_string(), "query");
        assert_eq!(DecodeSource::Path.to_string(), "path");
        assert_eq!(DecodeSource::Header.to_string(), "header");
    }
}
