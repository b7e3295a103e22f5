//! Test error types.

use thiserror::Error;

/// Errors raised while building a test request or reading a response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The URI did not parse.
    #[error("invalid uri {uri:?}: {message}")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Parser message.
        message: String,
    },

    /// A header name or value was rejected.
    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    /// The query string could not be encoded.
    #[error("encode query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// A JSON body could not be encoded or decoded.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body was not UTF-8.
    #[error("response body is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The request could not be assembled.
    #[error("build request: {0}")]
    Build(#[from] http::Error),
}
