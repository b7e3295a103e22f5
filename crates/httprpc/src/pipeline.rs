//! Typed handler pipeline.
//!
//! Adapts a typed handler and its codec into a transport [`HttpHandler`]:
//!
//! ```text
//! decode request ─┬─ error ──> encode 400 error
//!                 └─ ok ──> [decode meta] ─┬─ error ──> encode 400 error
//!                                          └─ ok ──> handler ─┬─ error ──> encode error
//!                                                             └─ ok ──> encode response
//! ```
//!
//! An encode failure after the handler succeeded is logged and answered
//! with a bare `500`.

use http::StatusCode;
use httprpc_core::{BoxedHandler, BoxedMetaHandler, HandlerResult, RequestContext, RequestId, StatusError};
use httprpc_extract::{decode_meta, Codec, DecodeError, ExtractionContext, FieldBinder};
use httprpc_middleware::{handler_fn, HttpHandler, Request, Response, ResponseExt};
use httprpc_router::Params;
use http_body_util::BodyExt;
use std::error::Error;
use std::sync::Arc;
use tracing::error;

/// The route a request was dispatched to.
///
/// The dispatcher stores it in the request extensions before calling the
/// endpoint's middleware chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute {
    route: String,
    params: Params,
}

impl MatchedRoute {
    pub(crate) fn new(route: impl Into<String>, params: Params) -> Self {
        Self {
            route: route.into(),
            params,
        }
    }

    /// The registered path, e.g. `/users/:user_id`.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The captured Path Parameter Bag.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Splits a transport request into the handler context and the decoding
/// view of the request.
async fn split(request: Request) -> (RequestContext, ExtractionContext) {
    let (parts, body) = request.into_parts();
    // A `Full` body yields its bytes in one frame and cannot fail.
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };

    let matched = parts.extensions.get::<MatchedRoute>().cloned();
    let params = matched
        .as_ref()
        .map(|m| m.params.clone())
        .unwrap_or_default();
    let request_id = parts
        .extensions
        .get::<RequestId>()
        .copied()
        .unwrap_or_default();

    let mut ctx = RequestContext::new()
        .with_request_id(request_id)
        .with_method(parts.method.clone())
        .with_path(parts.uri.path())
        .with_params(params.clone())
        .with_extensions(parts.extensions);
    if let Some(matched) = matched {
        ctx = ctx.with_route(matched.route);
    }

    let extraction = ExtractionContext::new(parts.method, parts.uri, parts.headers, body, params);
    (ctx, extraction)
}

fn encode_failure<Req: 'static, Res: 'static>(
    codec: &dyn Codec<Req, Res>,
    failure: DecodeError,
) -> Response {
    let status = failure.status_code();
    encode_error(codec, &StatusError::new(status, failure))
}

fn encode_error<Req: 'static, Res: 'static>(
    codec: &dyn Codec<Req, Res>,
    err: &(dyn Error + Send + Sync + 'static),
) -> Response {
    codec.encode_error(err).unwrap_or_else(|encode_err| {
        error!(error = %encode_err, "failed to encode error response");
        Response::status_text(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

fn respond<Req: 'static, Res: 'static>(
    codec: &dyn Codec<Req, Res>,
    result: HandlerResult<Res>,
) -> Response {
    match result {
        Ok(response) => codec.encode(response).unwrap_or_else(|encode_err| {
            error!(error = %encode_err, "failed to encode response");
            Response::status_text(StatusCode::INTERNAL_SERVER_ERROR)
        }),
        Err(err) => encode_error(codec, err.as_ref()),
    }
}

/// Adapts a plain typed handler.
pub(crate) fn adapt<Req, Res>(
    handler: BoxedHandler<Req, Res>,
    codec: Arc<dyn Codec<Req, Res>>,
) -> HttpHandler
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    handler_fn(move |request: Request| {
        let handler = handler.clone();
        let codec = codec.clone();
        async move {
            let (ctx, extraction) = split(request).await;
            let decoded = match codec.decode(&extraction) {
                Ok(decoded) => decoded,
                Err(failure) => return encode_failure(codec.as_ref(), failure),
            };
            let result = handler(ctx, decoded).await;
            respond(codec.as_ref(), result)
        }
    })
}

/// Adapts a meta-aware typed handler. Metadata is decoded after the request.
pub(crate) fn adapt_meta<Req, Meta, Res>(
    handler: BoxedMetaHandler<Req, Meta, Res>,
    codec: Arc<dyn Codec<Req, Res>>,
) -> HttpHandler
where
    Req: Send + 'static,
    Meta: FieldBinder + Default + Send,
    Res: Send + 'static,
{
    handler_fn(move |request: Request| {
        let handler = handler.clone();
        let codec = codec.clone();
        async move {
            let (ctx, extraction) = split(request).await;
            let decoded = match codec.decode(&extraction) {
                Ok(decoded) => decoded,
                Err(failure) => return encode_failure(codec.as_ref(), failure),
            };
            let meta = match decode_meta::<Meta>(&extraction) {
                Ok(meta) => meta,
                Err(failure) => return encode_failure(codec.as_ref(), failure),
            };
            let result = handler(ctx, decoded, meta).await;
            respond(codec.as_ref(), result)
        }
    })
}
