//! Request and response codecs.
//!
//! A [`Codec`] is the one pluggable policy of an endpoint: it turns the
//! buffered request into the handler's request type and turns the handler's
//! result (or error) into a transport response. [`JsonCodec`] is used when
//! an endpoint does not configure its own.

use crate::context::ExtractionContext;
use crate::error::{DecodeError, DecodeSource};
use crate::fields::FieldBinder;
use crate::query::decode_query;
use bytes::Bytes;
use http::{header, Method, Response, StatusCode};
use http_body_util::Full;
use httprpc_core::status_of;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use thiserror::Error;

/// The JSON media type.
pub const APPLICATION_JSON: &str = "application/json";

/// A response could not be produced.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value could not be serialized.
    #[error("encode response: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The error payload could not be serialized.
    #[error("encode error response: {0}")]
    SerializeError(#[source] serde_json::Error),

    /// The response head was invalid.
    #[error("build response: {0}")]
    Build(#[from] http::Error),
}

/// Conversion between the wire and an endpoint's typed request and response.
pub trait Codec<Req, Res>: Send + Sync + 'static {
    /// Decodes the typed request.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; the pipeline answers it with `400 Bad Request`.
    fn decode(&self, ctx: &ExtractionContext) -> Result<Req, DecodeError>;

    /// Encodes a successful response.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if the response cannot be produced.
    fn encode(&self, response: Res) -> Result<Response<Full<Bytes>>, EncodeError>;

    /// Encodes a handler or decode error.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if the response cannot be produced.
    fn encode_error(
        &self,
        error: &(dyn Error + Send + Sync + 'static),
    ) -> Result<Response<Full<Bytes>>, EncodeError>;

    /// Media types accepted by [`decode`](Self::decode).
    fn consumes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Media types produced by [`encode`](Self::encode).
    fn produces(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The default JSON codec.
///
/// - `GET` requests decode from the query string.
/// - Other methods decode the body as JSON. An empty body yields the
///   request type's default value, and data after the first JSON value is
///   ignored.
/// - Responses are JSON with status `200 OK` unless
///   [`with_status`](Self::with_status) was used.
/// - Errors are `{"error": "<message>"}` with the status of the first
///   [`StatusError`](httprpc_core::StatusError) in the error's source chain,
///   else `500 Internal Server Error`.
///
/// # Example
///
/// ```rust
/// use httprpc_extract::{Codec, JsonCodec};
/// use http::StatusCode;
///
/// let codec = JsonCodec::new().with_status(StatusCode::CREATED);
/// let response = Codec::<(), _>::encode(&codec, serde_json::json!({"id": 7})).unwrap();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    status: Option<StatusCode>,
}

impl JsonCodec {
    /// A codec answering `200 OK` on success.
    #[must_use]
    pub const fn new() -> Self {
        Self { status: None }
    }

    /// Uses `status` for successful responses.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The configured success status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    fn json(status: StatusCode, body: Vec<u8>) -> Result<Response<Full<Bytes>>, EncodeError> {
        Ok(Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, APPLICATION_JSON)
            .body(Full::new(Bytes::from(body)))?)
    }
}

/// Decodes the first JSON value of `body`, or `T::default()` if the body
/// holds only whitespace.
///
/// # Errors
///
/// Returns a body [`DecodeError`] for malformed JSON or a type mismatch.
pub fn decode_json_body<T>(body: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Default,
{
    match serde_json::Deserializer::from_slice(body).into_iter::<T>().next() {
        None => Ok(T::default()),
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(DecodeError::malformed(
            DecodeSource::Body,
            format!("decode request: {e}"),
        )),
    }
}

impl<Req, Res> Codec<Req, Res> for JsonCodec
where
    Req: DeserializeOwned + FieldBinder + Default,
    Res: Serialize,
{
    fn decode(&self, ctx: &ExtractionContext) -> Result<Req, DecodeError> {
        if ctx.method() == Method::GET {
            return decode_query(ctx);
        }
        decode_json_body(ctx.body())
    }

    fn encode(&self, response: Res) -> Result<Response<Full<Bytes>>, EncodeError> {
        let mut body = serde_json::to_vec(&response).map_err(EncodeError::Serialize)?;
        body.push(b'\n');
        Self::json(self.status.unwrap_or(StatusCode::OK), body)
    }

    fn encode_error(
        &self,
        error: &(dyn Error + Send + Sync + 'static),
    ) -> Result<Response<Full<Bytes>>, EncodeError> {
        let status = status_of(error).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = serde_json::to_vec(&serde_json::json!({ "error": error.to_string() }))
            .map_err(EncodeError::SerializeError)?;
        body.push(b'\n');
        Self::json(status, body)
    }

    fn consumes(&self) -> Vec<String> {
        vec![APPLICATION_JSON.to_string()]
    }

    fn produces(&self) -> Vec<String> {
        vec![APPLICATION_JSON.to_string()]
    }
}
