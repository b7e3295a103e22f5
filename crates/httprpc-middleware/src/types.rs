//! Transport request and response types used by middleware and handlers.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;

/// The transport request type: an `http::Request` with a buffered body.
pub type Request = http::Request<Full<Bytes>>;

/// The transport response type: an `http::Response` with a buffered body.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building plain responses.
pub trait ResponseExt {
    /// A `text/plain` response with the given status and message.
    fn error(status: StatusCode, message: &str) -> Response;

    /// An `application/json` response of the form `{"error": message}`.
    fn json_error(status: StatusCode, message: &str) -> Response;

    /// A `text/plain` response whose body is the status' canonical reason.
    fn status_text(status: StatusCode) -> Response;
}

impl ResponseExt for Response {
    fn error(status: StatusCode, message: &str) -> Response {
        with_body(
            status,
            "text/plain; charset=utf-8",
            Bytes::from(format!("{message}\n")),
        )
    }

    fn json_error(status: StatusCode, message: &str) -> Response {
        let body = serde_json::json!({ "error": message });
        with_body(status, "application/json", Bytes::from(body.to_string()))
    }

    fn status_text(status: StatusCode) -> Response {
        Self::error(status, status.canonical_reason().unwrap_or("Unknown Status"))
    }
}

fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
