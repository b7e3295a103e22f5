//! Handler error types.
//!
//! Typed handlers return [`HandlerError`], a boxed error. Any error in the
//! chain may be a [`StatusError`], in which case the codec encodes the
//! response with that status instead of `500 Internal Server Error`.
//!
//! | Origin | Status |
//! |---|---|
//! | request, path or header decoding | `400` (always) |
//! | handler returns a [`StatusError`] (anywhere in the chain) | its status |
//! | any other handler error | `500` |

use http::StatusCode;
use std::error::Error;
use thiserror::Error;

/// A type-erased, thread-safe error.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// The error type returned by typed handlers.
///
/// Anything implementing [`std::error::Error`] converts into it with `?`.
pub type HandlerError = BoxError;

/// An error marked with the HTTP status it should be encoded with.
///
/// The message of a `StatusError` is the message of the wrapped error.
///
/// # Example
///
/// ```
/// use httprpc_core::{status_of, HandlerError, StatusError};
/// use http::StatusCode;
///
/// fn find_user(id: u64) -> Result<String, HandlerError> {
///     if id == 0 {
///         return Err(StatusError::not_found("user not found").into());
///     }
///     Ok(format!("user-{id}"))
/// }
///
/// let err = find_user(0).unwrap_err();
/// assert_eq!(status_of(err.as_ref()), Some(StatusCode::NOT_FOUND));
/// assert_eq!(err.to_string(), "user not found");
/// ```
#[derive(Debug, Error)]
#[error("{source}")]
pub struct StatusError {
    status: StatusCode,
    #[source]
    source: BoxError,
}

impl StatusError {
    /// Wraps `source` with `status`.
    #[must_use]
    pub fn new(status: StatusCode, source: impl Into<BoxError>) -> Self {
        Self {
            status,
            source: source.into(),
        }
    }

    /// A `400 Bad Request` error.
    #[must_use]
    pub fn bad_request(source: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, source)
    }

    /// A `401 Unauthorized` error.
    #[must_use]
    pub fn unauthorized(source: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, source)
    }

    /// A `403 Forbidden` error.
    #[must_use]
    pub fn forbidden(source: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::FORBIDDEN, source)
    }

    /// A `404 Not Found` error.
    #[must_use]
    pub fn not_found(source: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::NOT_FOUND, source)
    }

    /// A `409 Conflict` error.
    #[must_use]
    pub fn conflict(source: impl Into<BoxError>) -> Self {
        Self::new(StatusCode::CONFLICT, source)
    }

    /// The status this error is encoded with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The wrapped error.
    #[must_use]
    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    /// Consumes the wrapper, returning the wrapped error.
    #[must_use]
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

/// Returns the status of the first [`StatusError`] in `err`'s source chain.
#[must_use]
pub fn status_of(err: &(dyn Error + 'static)) -> Option<StatusCode> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(status_error) = e.downcast_ref::<StatusError>() {
            return Some(status_error.status);
        }
        current = e.source();
    }
    None
}
