//! # httprpc
//!
//! Typed request dispatch over HTTP.
//!
//! Register strongly typed handlers under a method and path, group them under
//! prefixes with shared middleware, then build an immutable [`RpcService`]
//! that matches requests, decodes them into typed values, runs the handler
//! and encodes the result.
//!
//! - Routes are exact (`/users`) or single-segment parameterized
//!   (`/users/:user_id`). Duplicate and ambiguous routes fail the build.
//! - Requests decode from the JSON body, or the query string for `GET`.
//!   Metadata types bind path parameters and headers.
//! - Middleware composes by priority across the group tree.
//! - Every endpoint is described for tooling: see [`Router::describe`].
//!
//! ## Example
//!
//! ```rust
//! use httprpc::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Greet {
//!     name: String,
//! }
//!
//! impl FieldBinder for Greet {
//!     fn field_table() -> &'static FieldTable<Self> {
//!         static TABLE: std::sync::OnceLock<FieldTable<Greet>> = std::sync::OnceLock::new();
//!         TABLE.get_or_init(|| {
//!             FieldTable::<Greet>::builder("Greet")
//!                 .field("Name", |g| &mut g.name)
//!                 .build()
//!         })
//!     }
//! }
//!
//! #[derive(Serialize)]
//! struct Greeting {
//!     message: String,
//! }
//!
//! async fn greet(_ctx: RequestContext, req: Greet) -> Result<Greeting, HandlerError> {
//!     Ok(Greeting { message: format!("hello, {}", req.name) })
//! }
//!
//! let router = Router::new();
//! router
//!     .group("/v1")
//!     .unwrap()
//!     .register(Endpoint::<Greet, Greeting>::get("/greet"), greet)
//!     .unwrap();
//! let service = router.build().unwrap();
//! assert_eq!(service.route_count(), 1);
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! Router ── register / group / use_middleware ──> build() ──> RpcService
//!   (mutable)                                     (seals)     (immutable, shared)
//! ```

#![doc(html_root_url = "https://docs.rs/httprpc/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod describe;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod group;
mod pipeline;

pub use config::{ConfigError, HttpRpcConfig, RouterConfig};
pub use describe::{EndpointDescription, EndpointMeta, TypeInfo, TypeRef};
pub use dispatch::RpcService;
pub use endpoint::{Endpoint, MetaEndpoint, MetaRegisterOptions, RegisterOptions};
pub use error::{BuildError, RegistrationError};
pub use group::{EndpointGroup, Router};
pub use pipeline::MatchedRoute;

pub use httprpc_core as core;
pub use httprpc_extract as extract;
pub use httprpc_middleware as middleware;
pub use httprpc_router as router;
pub use httprpc_telemetry as telemetry;

/// Common imports for registering endpoints.
///
/// ```rust
/// use httprpc::prelude::*;
///
/// let router = Router::new();
/// let _v1: EndpointGroup = router.group("/v1").unwrap();
/// ```
pub mod prelude {
    pub use crate::{
        BuildError, Endpoint, EndpointGroup, MetaEndpoint, RegisterOptions, RegistrationError,
        Router, RpcService,
    };
    pub use httprpc_core::{
        typed_middleware, Empty, HandlerError, HandlerResult, RequestContext, StatusError,
    };
    pub use httprpc_extract::{FieldBinder, FieldTable, JsonCodec};
    pub use httprpc_middleware::{from_fn, Middleware, Next, Request, Response};
}
