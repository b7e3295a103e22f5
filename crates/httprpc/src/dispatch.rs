//! The serve phase.
//!
//! [`RpcService`] owns the dispatch table produced by a router build. It is
//! immutable and cheap to clone; every clone shares the same table.
//!
//! For each request:
//!
//! 1. optionally strip a trailing slash, then split the path into segments
//!    and percent-decode each one
//! 2. look the method and segments up in the table
//! 3. on a match, store the [`MatchedRoute`] in the request extensions and
//!    run the endpoint's composed handler
//! 4. on a path match with the wrong method, answer `405` with `Allow`
//! 5. otherwise run the fallback, or answer `404`

use crate::pipeline::MatchedRoute;
use bytes::Bytes;
use http::header::{HeaderValue, ALLOW};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use httprpc_core::{BoxFuture, RequestId};
use httprpc_middleware::{HttpHandler, Request, Response, ResponseExt};
use httprpc_router::{DispatchTable, Lookup};
use httprpc_telemetry::{record_dispatch, DispatchOutcome};
use hyper::body::Incoming;
use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

struct Inner {
    table: DispatchTable<HttpHandler>,
    fallback: Option<HttpHandler>,
    route_count: usize,
    strip_trailing_slash: bool,
}

/// A built, servable router.
///
/// Use [`handle`](Self::handle) in memory, or hand the service to a hyper
/// connection: it implements [`hyper::service::Service`] for
/// `http::Request<Incoming>`.
///
/// ```rust,ignore
/// let service = router.build()?;
/// let io = hyper_util::rt::TokioIo::new(stream);
/// hyper::server::conn::http1::Builder::new()
///     .serve_connection(io, service)
///     .await?;
/// ```
#[derive(Clone)]
pub struct RpcService {
    inner: Arc<Inner>,
}

impl RpcService {
    pub(crate) fn new(
        table: DispatchTable<HttpHandler>,
        fallback: Option<HttpHandler>,
        route_count: usize,
        strip_trailing_slash: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                table,
                fallback,
                route_count,
                strip_trailing_slash,
            }),
        }
    }

    /// Number of registered method and path combinations.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.route_count
    }

    /// Number of distinct paths without parameters.
    #[must_use]
    pub fn static_paths(&self) -> usize {
        self.inner.table.static_paths()
    }

    /// Number of distinct parameterized paths.
    #[must_use]
    pub fn pattern_paths(&self) -> usize {
        self.inner.table.pattern_paths()
    }

    /// Dispatches one buffered request.
    pub async fn handle(&self, mut request: Request) -> Response {
        let started = Instant::now();
        if request.extensions().get::<RequestId>().is_none() {
            request.extensions_mut().insert(RequestId::new());
        }

        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let segments = decode_segments(&path, self.inner.strip_trailing_slash);
        let segments: Vec<&str> = segments.iter().map(AsRef::as_ref).collect();

        let (outcome, response) = match self.inner.table.lookup_segments(&method, &segments) {
            Lookup::Found {
                handler,
                params,
                route,
            } => {
                debug!(%method, %path, route, "dispatching");
                request
                    .extensions_mut()
                    .insert(MatchedRoute::new(route, params));
                (DispatchOutcome::Matched, handler(request).await)
            }
            Lookup::MethodNotAllowed { allow } => {
                debug!(%method, %path, allow, "method not allowed");
                (DispatchOutcome::MethodNotAllowed, method_not_allowed(allow))
            }
            Lookup::NotFound => match &self.inner.fallback {
                Some(fallback) => {
                    debug!(%method, %path, "no route, using fallback");
                    (DispatchOutcome::Fallback, fallback(request).await)
                }
                None => {
                    debug!(%method, %path, "no route");
                    (
                        DispatchOutcome::NotFound,
                        Response::error(StatusCode::NOT_FOUND, "404 page not found"),
                    )
                }
            },
        };

        record_dispatch(outcome, started.elapsed());
        response
    }
}

impl fmt::Debug for RpcService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcService")
            .field("routes", &self.inner.route_count)
            .field("fallback", &self.inner.fallback.is_some())
            .field("strip_trailing_slash", &self.inner.strip_trailing_slash)
            .finish_non_exhaustive()
    }
}

impl hyper::service::Service<http::Request<Incoming>> for RpcService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn call(&self, request: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(error = %e, path = parts.uri.path(), "failed to read request body");
                    return Ok(Response::error(
                        StatusCode::BAD_REQUEST,
                        &format!("read request body: {e}"),
                    ));
                }
            };
            let request = http::Request::from_parts(parts, Full::<Bytes>::new(body));
            Ok(service.handle(request).await)
        })
    }
}

fn method_not_allowed(allow: &str) -> Response {
    let mut response = Response::status_text(StatusCode::METHOD_NOT_ALLOWED);
    if let Ok(value) = HeaderValue::from_str(allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

/// Drops one trailing slash from any path but the root.
pub(crate) fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Splits the path on `/` and percent-decodes each segment.
///
/// Decoding after the split keeps an encoded `%2F` inside its segment. A
/// segment that is not valid UTF-8 after decoding is matched as sent.
fn decode_segments(raw: &str, strip_trailing_slash: bool) -> Vec<Cow<'_, str>> {
    let path = if strip_trailing_slash {
        trim_trailing_slash(raw)
    } else {
        raw
    };
    path.split('/')
        .map(|segment| urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment)))
        .collect()
}
