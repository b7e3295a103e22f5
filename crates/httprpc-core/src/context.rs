//! Request context types.
//!
//! The [`RequestContext`] is created by the typed pipeline for every request
//! and handed to the typed middleware chain and the handler.

use http::{Extensions, Method};
use httprpc_router::Params;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request logs sortable.
///
/// # Example
///
/// ```
/// use httprpc_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request state visible to typed middleware and handlers.
///
/// Carries the request ID, the method, the concrete request path, the
/// registered route that matched it, the Path Parameter Bag, and the
/// transport request's extensions. Extensions are how untyped middleware
/// passes values (an authenticated user, a deadline) down to handlers.
///
/// # Example
///
/// ```
/// use httprpc_core::RequestContext;
/// use httprpc_router::Params;
/// use http::Method;
///
/// let mut params = Params::new();
/// params.push("id", "42");
///
/// let ctx = RequestContext::new()
///     .with_method(Method::GET)
///     .with_path("/users/42")
///     .with_route("/users/:id")
///     .with_params(params);
///
/// assert_eq!(ctx.param("id"), Some("42"));
/// assert_eq!(ctx.route(), Some("/users/:id"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    route: Option<String>,
    params: Params,
    extensions: Extensions,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for `GET /` with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/".to_string(),
            route: None,
            params: Params::new(),
            extensions: Extensions::new(),
            started_at: Instant::now(),
        }
    }

    /// Creates a context for unit tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new()
    }

    /// Returns a context with the given request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns a context with the given method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns a context with the given request path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Returns a context with the given matched route.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Returns a context with the given path parameters.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Returns a context with the given extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the concrete request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the registered route that matched, if any.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Returns the Path Parameter Bag.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Returns one captured path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the request extensions.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the request extensions mutably.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns the elapsed time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
