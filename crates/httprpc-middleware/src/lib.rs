//! # httprpc Middleware
//!
//! Transport-level middleware for httprpc.
//!
//! Middleware wraps an [`HttpHandler`]. Groups register middleware with a
//! priority; for every endpoint the composer collects the entries of the
//! endpoint's group and all its ancestors and orders them:
//!
//! - higher priority wraps outer (runs first on the way in)
//! - for equal priority, middleware from an ancestor group wraps outer
//! - within one group, a later registration wraps outer
//!
//! ## Example
//!
//! ```
//! use httprpc_middleware::{apply, collect, from_fn, handler_fn, MiddlewareEntry, Next, Request, Response, ResponseExt};
//! use http::StatusCode;
//!
//! let root = vec![MiddlewareEntry::new(
//!     from_fn("auth", |req: Request, next: Next| async move {
//!         if req.headers().contains_key("authorization") {
//!             next.run(req).await
//!         } else {
//!             Response::json_error(StatusCode::UNAUTHORIZED, "missing credentials")
//!         }
//!     }),
//!     10,
//! )];
//!
//! let handler = handler_fn(|_req: Request| async { Response::error(StatusCode::OK, "ok") });
//! let composed = apply(handler, &collect([root.as_slice()]));
//! # let _ = composed;
//! ```

#![doc(html_root_url = "https://docs.rs/httprpc-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod middleware;
pub mod types;

pub use compose::{apply, collect, MiddlewareEntry};
pub use middleware::{
    from_fn, handler_fn, wrap, BoxFuture, FnMiddleware, HttpHandler, Middleware, Next,
};
pub use types::{Request, Response, ResponseExt};
