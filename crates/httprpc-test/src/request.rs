//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use httprpc_middleware::Request;
use serde::Serialize;

/// Builder for a transport request.
///
/// Invalid input is remembered and reported by [`build`](Self::build), so
/// the builder chain never panics.
#[derive(Debug)]
#[must_use]
pub struct TestRequest {
    method: Method,
    uri: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest {
    /// A request with `method` for `uri`.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// A `GET` request.
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// A `POST` request.
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Appends a header. Repeating a name keeps every value.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => self.fail(TestError::InvalidHeader(name.to_string())),
        }
        self
    }

    /// Encodes `value` as the query string, replacing any query in the URI.
    pub fn query<T: Serialize>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(query) => self.query = Some(query),
            Err(err) => self.fail(err.into()),
        }
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and the `application/json` content type.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.body = Bytes::from(bytes);
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Err(err) => self.fail(err.into()),
        }
        self
    }

    fn fail(&mut self, err: TestError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Assembles the transport request.
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by the builder, or
    /// [`TestError::InvalidUri`].
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let uri = match &self.query {
            Some(query) => {
                let path = self.uri.split_once('?').map_or(self.uri.as_str(), |(p, _)| p);
                format!("{path}?{query}")
            }
            None => self.uri.clone(),
        };
        let uri: Uri = uri.parse().map_err(|e: http::uri::InvalidUri| TestError::InvalidUri {
            uri: self.uri.clone(),
            message: e.to_string(),
        })?;

        let mut request = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .body(Full::new(self.body))?;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}
