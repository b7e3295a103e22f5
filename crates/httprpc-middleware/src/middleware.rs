//! Core middleware trait and types.
//!
//! A transport handler is an [`HttpHandler`]: a shareable async function from
//! [`Request`] to [`Response`]. A [`Middleware`] receives the request and a
//! [`Next`] that runs the rest of the chain; it may act before and after
//! calling it, or answer on its own without calling it.
//!
//! [`wrap`] turns a middleware plus an inner handler into a new handler, which
//! is the only operation the composer needs.
//!
//! # Example
//!
//! ```
//! use httprpc_middleware::{from_fn, handler_fn, wrap, Next, Request, Response, ResponseExt};
//! use http::StatusCode;
//! use std::sync::Arc;
//!
//! let inner = handler_fn(|_req: Request| async { Response::error(StatusCode::OK, "ok") });
//!
//! let teapot = from_fn("teapot", |req: Request, next: Next| async move {
//!     let mut response = next.run(req).await;
//!     *response.status_mut() = StatusCode::IM_A_TEAPOT;
//!     response
//! });
//!
//! let handler = wrap(Arc::new(teapot), inner);
//! # let _ = handler;
//! ```

use crate::types::{Request, Response};
pub use httprpc_core::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A shareable transport handler.
pub type HttpHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Builds an [`HttpHandler`] from an async function.
pub fn handler_fn<F, Fut>(f: F) -> HttpHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request| Box::pin(f(request)))
}

/// A transport-level middleware.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once
/// - Middleware that does not call `next.run()` answers the request itself
pub trait Middleware: Send + Sync + 'static {
    /// A name used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, usually by delegating to `next`.
    fn process<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Response>;
}

/// The remainder of the chain below a middleware.
pub struct Next {
    handler: HttpHandler,
}

impl Next {
    /// Creates a `Next` that invokes `handler`.
    #[must_use]
    pub fn new(handler: HttpHandler) -> Self {
        Self { handler }
    }

    /// Runs the rest of the chain.
    ///
    /// Consumes `self` so it can only be called once.
    pub async fn run(self, request: Request) -> Response {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Returns a handler that runs `middleware` around `inner`.
pub fn wrap(middleware: Arc<dyn Middleware>, inner: HttpHandler) -> HttpHandler {
    Arc::new(move |request| {
        let middleware = middleware.clone();
        let next = Next::new(inner.clone());
        Box::pin(async move { middleware.process(request, next).await })
    })
}

/// A middleware created from an async function.
///
/// # Example
///
/// ```
/// use httprpc_middleware::{FnMiddleware, Middleware, Next, Request};
///
/// let timing = FnMiddleware::new("timing", |req: Request, next: Next| async move {
///     let start = std::time::Instant::now();
///     let response = next.run(req).await;
///     tracing::debug!(elapsed = ?start.elapsed(), "request finished");
///     response
/// });
/// assert_eq!(timing.name(), "timing");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Response> {
        Box::pin((self.func)(request, next))
    }
}

/// Shorthand for [`FnMiddleware::new`].
pub const fn from_fn<F>(name: &'static str, func: F) -> FnMiddleware<F> {
    FnMiddleware::new(name, func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        visited: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(&'a self, request: Request, next: Next) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.visited.lock().unwrap().push(self.name);
                next.run(request).await
            })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn ok_handler() -> HttpHandler {
        handler_fn(|_req: Request| async { Response::error(StatusCode::OK, "OK") })
    }

    #[tokio::test]
    async fn test_next_runs_handler() {
        let response = Next::new(ok_handler()).run(request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_wrap_chain_runs_outer_first() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::new(Recorder {
            name: "inner",
            visited: visited.clone(),
        });
        let outer = Arc::new(Recorder {
            name: "outer",
            visited: visited.clone(),
        });

        let handler = wrap(outer, wrap(inner, ok_handler()));
        let response = handler(request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*visited.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuits() {
        let deny = from_fn("deny", |_req: Request, _next: Next| async {
            Response::error(StatusCode::FORBIDDEN, "Forbidden")
        });
        assert_eq!(deny.name(), "deny");

        let handler = wrap(Arc::new(deny), ok_handler());
        let response = handler(request()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_wrapped_handler_is_reusable() {
        let handler = wrap(
            Arc::new(from_fn("noop", |req: Request, next: Next| next.run(req))),
            ok_handler(),
        );

        for _ in 0..3 {
            assert_eq!(handler(request()).await.status(), StatusCode::OK);
        }
    }
}
