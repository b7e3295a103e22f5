//! Buffered test responses.

use crate::error::TestError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use httprpc_middleware::Response;
use serde::de::DeserializeOwned;
use std::fmt;

/// A fully read response with assertion helpers.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Reads a transport response into memory.
    pub async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// The status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as text, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Utf8`] for non-UTF-8 bodies.
    pub fn text(&self) -> Result<String, TestError> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// Deserializes a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Deserializes a JSON body into a [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Json`] if the body is not JSON.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// # Panics
    ///
    /// Panics if the status differs, printing the body.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(self.header(name), Some(expected), "header {name}");
        self
    }

    /// # Panics
    ///
    /// Panics if the body differs.
    #[track_caller]
    pub fn assert_body(&self, expected: &str) -> &Self {
        assert_eq!(String::from_utf8_lossy(&self.body), expected);
        self
    }

    /// # Panics
    ///
    /// Panics if the body is not JSON or differs from `expected`.
    #[track_caller]
    pub fn assert_json(&self, expected: &serde_json::Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected),
            Err(err) => panic!("{err}; body: {}", String::from_utf8_lossy(&self.body)),
        }
        self
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &String::from_utf8_lossy(&self.body))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httprpc_middleware::ResponseExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_reads_json_error() {
        let response = TestResponse::from_response(Response::json_error(
            StatusCode::BAD_REQUEST,
            "decode request: eof",
        ))
        .await;

        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_header("content-type", "application/json")
            .assert_json(&json!({"error": "decode request: eof"}));
    }

    #[tokio::test]
    async fn test_text_body() {
        let response =
            TestResponse::from_response(Response::status_text(StatusCode::NOT_FOUND)).await;
        assert_eq!(response.text().unwrap(), "Not Found\n");
        assert!(response.json_value().is_err());
    }
}
