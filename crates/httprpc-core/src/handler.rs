//! Typed handler traits and typed middleware.
//!
//! A typed handler receives the [`RequestContext`] and the decoded request
//! value and returns the response value or a [`HandlerError`]. Endpoints with
//! path/header metadata use [`MetaHandler`], which additionally receives the
//! decoded metadata value.
//!
//! Handlers are boxed into [`BoxedHandler`] / [`BoxedMetaHandler`] so that
//! typed middleware can wrap them. A [`TypedMiddleware`] takes the next
//! handler and returns a wrapped one; [`apply_typed`] applies a list so that
//! the first entry ends up outermost.

use crate::{HandlerError, RequestContext};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a typed handler resolves to.
pub type HandlerResult<Res> = Result<Res, HandlerError>;

/// A typed handler.
///
/// Implemented for every `Fn(RequestContext, Req) -> impl Future<Output =
/// Result<Res, HandlerError>>`, which covers plain `async fn` items.
///
/// # Example
///
/// ```
/// use httprpc_core::{Handler, HandlerError, RequestContext};
///
/// async fn greet(_ctx: RequestContext, name: String) -> Result<String, HandlerError> {
///     Ok(format!("Hello, {name}!"))
/// }
///
/// fn assert_handler<H: Handler<String, String>>(_: &H) {}
/// assert_handler(&greet);
/// ```
pub trait Handler<Req, Res>: Send + Sync + 'static {
    /// Handles one decoded request.
    fn handle(&self, ctx: RequestContext, request: Req) -> BoxFuture<'static, HandlerResult<Res>>;
}

impl<F, Fut, Req, Res> Handler<Req, Res> for F
where
    F: Fn(RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<Res>> + Send + 'static,
{
    fn handle(&self, ctx: RequestContext, request: Req) -> BoxFuture<'static, HandlerResult<Res>> {
        Box::pin(self(ctx, request))
    }
}

/// A typed handler that also receives decoded path/header metadata.
pub trait MetaHandler<Req, Meta, Res>: Send + Sync + 'static {
    /// Handles one decoded request together with its metadata.
    fn handle(
        &self,
        ctx: RequestContext,
        request: Req,
        meta: Meta,
    ) -> BoxFuture<'static, HandlerResult<Res>>;
}

impl<F, Fut, Req, Meta, Res> MetaHandler<Req, Meta, Res> for F
where
    F: Fn(RequestContext, Req, Meta) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<Res>> + Send + 'static,
{
    fn handle(
        &self,
        ctx: RequestContext,
        request: Req,
        meta: Meta,
    ) -> BoxFuture<'static, HandlerResult<Res>> {
        Box::pin(self(ctx, request, meta))
    }
}

/// A type-erased, shareable typed handler.
pub type BoxedHandler<Req, Res> =
    Arc<dyn Fn(RequestContext, Req) -> BoxFuture<'static, HandlerResult<Res>> + Send + Sync>;

/// A type-erased, shareable typed handler with metadata.
pub type BoxedMetaHandler<Req, Meta, Res> =
    Arc<dyn Fn(RequestContext, Req, Meta) -> BoxFuture<'static, HandlerResult<Res>> + Send + Sync>;

/// Middleware over a boxed typed handler `H`.
///
/// `H` is [`BoxedHandler`] for plain endpoints and [`BoxedMetaHandler`] for
/// endpoints with metadata.
pub type TypedMiddleware<H> = Arc<dyn Fn(H) -> H + Send + Sync>;

/// Boxes a typed handler.
pub fn boxed<Req, Res, H>(handler: H) -> BoxedHandler<Req, Res>
where
    H: Handler<Req, Res>,
    Req: 'static,
    Res: 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |ctx, request| handler.handle(ctx, request))
}

/// Boxes a typed handler with metadata.
pub fn boxed_meta<Req, Meta, Res, H>(handler: H) -> BoxedMetaHandler<Req, Meta, Res>
where
    H: MetaHandler<Req, Meta, Res>,
    Req: 'static,
    Meta: 'static,
    Res: 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |ctx, request, meta| handler.handle(ctx, request, meta))
}

/// Builds a [`TypedMiddleware`] from a closure.
///
/// # Example
///
/// ```
/// use httprpc_core::{typed_middleware, BoxedHandler, TypedMiddleware};
/// use std::sync::Arc;
///
/// let uppercase: TypedMiddleware<BoxedHandler<String, String>> =
///     typed_middleware(|next: BoxedHandler<String, String>| -> BoxedHandler<String, String> {
///         Arc::new(move |ctx, name: String| next(ctx, name.to_uppercase()))
///     });
/// # let _ = uppercase;
/// ```
pub fn typed_middleware<H, F>(wrap: F) -> TypedMiddleware<H>
where
    F: Fn(H) -> H + Send + Sync + 'static,
{
    Arc::new(wrap)
}

/// Wraps `handler` with `middlewares`; the first entry becomes outermost.
pub fn apply_typed<H>(handler: H, middlewares: &[TypedMiddleware<H>]) -> H {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware(next))
}

/// Request or response type for endpoints that carry no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}
