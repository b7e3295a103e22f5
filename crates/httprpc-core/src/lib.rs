//! # httprpc Core
//!
//! Foundational types shared by every httprpc crate:
//!
//! - [`RequestContext`] - Per-request context handed to typed handlers
//! - [`RequestId`] - UUID v7 request identifier
//! - [`StatusError`] - An error carrying the HTTP status it should be encoded with
//! - [`HandlerError`] - The boxed error type typed handlers return
//! - [`Handler`] / [`MetaHandler`] - Typed handler traits
//! - [`TypedMiddleware`] - Wrappers over boxed typed handlers

#![doc(html_root_url = "https://docs.rs/httprpc-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod handler;

pub use context::{RequestContext, RequestId};
pub use error::{status_of, BoxError, HandlerError, StatusError};
pub use handler::{
    apply_typed, boxed, boxed_meta, typed_middleware, BoxFuture, BoxedHandler, BoxedMetaHandler,
    Empty, Handler, HandlerResult, MetaHandler, TypedMiddleware,
};
