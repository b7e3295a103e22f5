//! Extraction context providing access to request data.
//!
//! The typed pipeline buffers the transport request into an
//! [`ExtractionContext`] before decoding. Codecs read the body and query
//! string from it; metadata decoding reads path parameters and headers.

use crate::error::{DecodeError, DecodeSource};
use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use httprpc_router::Params;

/// Context providing access to all parts of an HTTP request.
///
/// # Example
///
/// ```rust
/// use httprpc_extract::ExtractionContext;
/// use httprpc_router::Params;
/// use http::{HeaderMap, Method, Uri};
/// use bytes::Bytes;
///
/// let mut params = Params::new();
/// params.push("id", "123");
///
/// let ctx = ExtractionContext::new(
///     Method::GET,
///     Uri::from_static("/users/123?expand=teams&expand=roles"),
///     HeaderMap::new(),
///     Bytes::new(),
///     params,
/// );
///
/// assert_eq!(ctx.path_params().get("id"), Some("123"));
/// let query = ctx.query_values().unwrap();
/// assert_eq!(query.get("expand"), Some(&["teams".to_string(), "roles".to_string()][..]));
/// ```
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
}

impl ExtractionContext {
    /// Creates a new extraction context.
    #[must_use]
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
        path_params: Params,
    ) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            path_params,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the raw query string if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Parses the query string into a multi-valued map.
    ///
    /// # Errors
    ///
    /// Returns a query [`DecodeError`] if the query string is not valid
    /// `application/x-www-form-urlencoded` data.
    pub fn query_values(&self) -> Result<QueryValues, DecodeError> {
        QueryValues::parse(self.query_string().unwrap_or(""))
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns every value of header `name`, in order.
    ///
    /// # Errors
    ///
    /// Returns a header [`DecodeError`] if a value is not visible ASCII.
    pub fn header_values(&self, name: &str) -> Result<Vec<String>, DecodeError> {
        self.headers
            .get_all(name)
            .iter()
            .map(|value| {
                value.to_str().map(str::to_string).map_err(|e| {
                    DecodeError::invalid(DecodeSource::Header, name, format!("decode header {name}: {e}"))
                })
            })
            .collect()
    }

    /// Returns the request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the Path Parameter Bag.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }
}

/// Query parameters grouped by name, values kept in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    entries: Vec<(String, Vec<String>)>,
}

impl QueryValues {
    /// Parses an `application/x-www-form-urlencoded` query string.
    ///
    /// # Errors
    ///
    /// Returns a query [`DecodeError`] if the input cannot be decoded.
    pub fn parse(query: &str) -> Result<Self, DecodeError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).map_err(|e| {
            DecodeError::malformed(DecodeSource::Query, format!("decode query: {e}"))
        })?;

        let mut values = Self::default();
        for (name, value) in pairs {
            match values.entries.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => existing.push(value),
                None => values.entries.push((name, vec![value])),
            }
        }
        Ok(values)
    }

    /// Returns every value given for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Parameter names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Returns true if no parameters were given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
