//! The router and its endpoint group tree.
//!
//! A [`Router`] is the root [`EndpointGroup`]. Subgroups add a path prefix
//! and middleware. Every endpoint, whichever group registers it, lands in
//! one list owned by the root; [`Router::build`] turns that list into an
//! [`RpcService`].
//!
//! # Lifecycle
//!
//! ```text
//!   Router::new()                      registration phase
//!     ├── use_middleware(..)           (groups and endpoints mutable)
//!     ├── group("/v1")
//!     │     └── register(..)
//!     └── build() ───────────────────> sealed: RpcService
//!                                      later registrations are rejected
//! ```
//!
//! Building is attempted once. The outcome, a service or an error, is
//! cached and returned by every later call.
//!
//! # Example
//!
//! ```rust
//! use httprpc::{Endpoint, Router};
//! use httprpc_core::{Empty, HandlerError, RequestContext};
//!
//! async fn ping(_ctx: RequestContext, _req: Empty) -> Result<String, HandlerError> {
//!     Ok("pong".to_string())
//! }
//!
//! let router = Router::new();
//! let v1 = router.group("/v1").unwrap();
//! v1.register(Endpoint::<Empty, String>::get("/ping"), ping).unwrap();
//!
//! let service = router.build().unwrap();
//! assert_eq!(service.route_count(), 1);
//! assert!(router.register(Endpoint::<Empty, String>::get("/late"), ping).is_err());
//! ```

use crate::config::{ConfigError, RouterConfig};
use crate::describe::{EndpointDescription, EndpointMeta, TypeInfo};
use crate::dispatch::{trim_trailing_slash, RpcService};
use crate::endpoint::{Endpoint, MetaEndpoint, MetaRegisterOptions, RegisterOptions};
use crate::error::{BuildError, RegistrationError};
use crate::pipeline::{adapt, adapt_meta};
use http::Method;
use httprpc_core::{apply_typed, boxed, boxed_meta, Handler, MetaHandler};
use httprpc_extract::{validate_meta, Codec, FieldBinder, JsonCodec};
use httprpc_middleware::{apply, collect, HttpHandler, Middleware, MiddlewareEntry};
use httprpc_router::{RoutePattern, TableBuilder};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ROOT: usize = 0;

struct GroupNode {
    /// Effective prefix, ancestors included.
    prefix: String,
    parent: Option<usize>,
    middleware: Vec<MiddlewareEntry>,
}

struct RegisteredEndpoint {
    method: Method,
    pattern: RoutePattern,
    handler: HttpHandler,
    group: usize,
}

struct State {
    groups: Vec<GroupNode>,
    endpoints: Vec<RegisteredEndpoint>,
    metas: Vec<EndpointMeta>,
    fallback: Option<HttpHandler>,
    first_error: Option<RegistrationError>,
    built: Option<Result<RpcService, BuildError>>,
}

impl State {
    const fn is_sealed(&self) -> bool {
        self.built.is_some()
    }

    fn ancestry(&self, group: usize) -> impl Iterator<Item = &GroupNode> {
        std::iter::successors(self.groups.get(group), |node| {
            node.parent.and_then(|parent| self.groups.get(parent))
        })
    }

    fn record(&mut self, err: RegistrationError) -> RegistrationError {
        if self.first_error.is_none() {
            self.first_error = Some(err.clone());
        }
        err
    }
}

struct Shared {
    state: Mutex<State>,
    config: RouterConfig,
    default_codec: JsonCodec,
}

/// A node of the endpoint group tree.
///
/// Cloning a group yields another handle to the same node.
#[derive(Clone)]
pub struct EndpointGroup {
    shared: Arc<Shared>,
    index: usize,
    prefix: String,
}

impl EndpointGroup {
    /// The effective prefix: all ancestor prefixes concatenated.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derives a child group whose prefix is this group's prefix followed by
    /// `prefix`. Slashes are not normalized.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::SealedGroup`] once the router is built.
    pub fn group(&self, prefix: &str) -> Result<EndpointGroup, RegistrationError> {
        let full_prefix = format!("{}{prefix}", self.prefix);
        let mut state = self.shared.state.lock();
        if state.is_sealed() {
            warn!(prefix = %full_prefix, "group derived after build rejected");
            return Err(RegistrationError::SealedGroup {
                prefix: full_prefix,
            });
        }

        let index = state.groups.len();
        state.groups.push(GroupNode {
            prefix: full_prefix.clone(),
            parent: Some(self.index),
            middleware: Vec::new(),
        });
        Ok(EndpointGroup {
            shared: self.shared.clone(),
            index,
            prefix: full_prefix,
        })
    }

    /// Adds middleware with priority 0.
    ///
    /// It wraps every endpoint of this group and its descendants.
    pub fn use_middleware(&self, middleware: impl Middleware) -> Result<(), RegistrationError> {
        self.use_middleware_with_priority(middleware, 0)
    }

    /// Adds middleware with an explicit priority. Higher priority runs
    /// earlier.
    pub fn use_middleware_with_priority(
        &self,
        middleware: impl Middleware,
        priority: i32,
    ) -> Result<(), RegistrationError> {
        let mut state = self.shared.state.lock();
        if state.is_sealed() {
            warn!(prefix = %self.prefix, middleware = middleware.name(), "middleware added after build");
            return Err(RegistrationError::SealedGroup {
                prefix: self.prefix.clone(),
            });
        }
        debug!(prefix = %self.prefix, middleware = middleware.name(), priority, "middleware added");
        if let Some(node) = state.groups.get_mut(self.index) {
            node.middleware.push(MiddlewareEntry::new(middleware, priority));
        }
        Ok(())
    }

    /// Registers a typed endpoint with default options.
    ///
    /// # Errors
    ///
    /// Fails if the router is sealed or the path is invalid. A failure other
    /// than sealing also makes [`Router::build`] fail.
    pub fn register<Req, Res, H>(
        &self,
        endpoint: Endpoint<Req, Res>,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        Req: DeserializeOwned + FieldBinder + Default + Send,
        Res: Serialize + Send + 'static,
        H: Handler<Req, Res>,
    {
        self.register_with(endpoint, handler, RegisterOptions::new())
    }

    /// Registers a typed endpoint with a codec override and typed
    /// middleware.
    pub fn register_with<Req, Res, H>(
        &self,
        endpoint: Endpoint<Req, Res>,
        handler: H,
        options: RegisterOptions<Req, Res>,
    ) -> Result<(), RegistrationError>
    where
        Req: DeserializeOwned + FieldBinder + Default + Send,
        Res: Serialize + Send + 'static,
        H: Handler<Req, Res>,
    {
        let codec = self.codec(options.codec);
        let handler = apply_typed(boxed(handler), &options.middleware);
        let meta = self.meta::<Req, Res>(&endpoint.method(), endpoint.path(), None, codec.as_ref());
        self.insert(
            endpoint.method(),
            endpoint.path(),
            |_| Ok(()),
            adapt(handler, codec),
            meta,
        )
    }

    /// Registers a meta-aware endpoint with default options.
    ///
    /// # Errors
    ///
    /// As [`register`](Self::register), and also when `Meta` does not fit
    /// the route.
    pub fn register_meta<Req, Meta, Res, H>(
        &self,
        endpoint: MetaEndpoint<Req, Meta, Res>,
        handler: H,
    ) -> Result<(), RegistrationError>
    where
        Req: DeserializeOwned + FieldBinder + Default + Send,
        Meta: FieldBinder + Default + Send,
        Res: Serialize + Send + 'static,
        H: MetaHandler<Req, Meta, Res>,
    {
        self.register_with_meta(endpoint, handler, MetaRegisterOptions::new())
    }

    /// Registers a meta-aware endpoint with a codec override and typed
    /// middleware.
    pub fn register_with_meta<Req, Meta, Res, H>(
        &self,
        endpoint: MetaEndpoint<Req, Meta, Res>,
        handler: H,
        options: MetaRegisterOptions<Req, Meta, Res>,
    ) -> Result<(), RegistrationError>
    where
        Req: DeserializeOwned + FieldBinder + Default + Send,
        Meta: FieldBinder + Default + Send,
        Res: Serialize + Send + 'static,
        H: MetaHandler<Req, Meta, Res>,
    {
        let codec = self.codec(options.codec);
        let handler = apply_typed(boxed_meta(handler), &options.middleware);
        let meta = self.meta::<Req, Res>(
            &endpoint.method(),
            endpoint.path(),
            Some(TypeInfo::of::<Meta>()),
            codec.as_ref(),
        );
        self.insert(
            endpoint.method(),
            endpoint.path(),
            |pattern| validate_meta::<Meta>(pattern).map_err(RegistrationError::from),
            adapt_meta(handler, codec),
            meta,
        )
    }

    fn codec<Req, Res>(&self, custom: Option<Arc<dyn Codec<Req, Res>>>) -> Arc<dyn Codec<Req, Res>>
    where
        Req: DeserializeOwned + FieldBinder + Default,
        Res: Serialize + 'static,
    {
        match custom {
            Some(codec) => codec,
            None => Arc::new(self.shared.default_codec),
        }
    }

    fn meta<Req: 'static, Res: 'static>(
        &self,
        method: &Method,
        path: &str,
        meta: Option<TypeInfo>,
        codec: &dyn Codec<Req, Res>,
    ) -> EndpointMeta {
        EndpointMeta {
            method: method.clone(),
            path: self.full_path(path),
            request: TypeInfo::of::<Req>(),
            meta,
            response: TypeInfo::of::<Res>(),
            consumes: codec.consumes(),
            produces: codec.produces(),
        }
    }

    /// The group prefix joined with `path`. A trailing slash is dropped
    /// when requests have theirs dropped too.
    fn full_path(&self, path: &str) -> String {
        let full_path = format!("{}{path}", self.prefix);
        if self.shared.config.strip_trailing_slash {
            trim_trailing_slash(&full_path).to_string()
        } else {
            full_path
        }
    }

    fn insert(
        &self,
        method: Method,
        path: &str,
        validate: impl FnOnce(&RoutePattern) -> Result<(), RegistrationError>,
        handler: HttpHandler,
        meta: EndpointMeta,
    ) -> Result<(), RegistrationError> {
        let full_path = self.full_path(path);
        let mut state = self.shared.state.lock();

        if state.is_sealed() {
            warn!(%method, path = %full_path, "registration after build rejected");
            return Err(RegistrationError::Sealed {
                method,
                path: full_path,
            });
        }

        let pattern = match RoutePattern::parse(&full_path) {
            Ok(pattern) => pattern,
            Err(err) => return Err(state.record(err.into())),
        };
        if let Err(err) = validate(&pattern) {
            return Err(state.record(err));
        }

        debug!(%method, path = %full_path, "endpoint registered");
        state.endpoints.push(RegisteredEndpoint {
            method,
            pattern,
            handler,
            group: self.index,
        });
        state.metas.push(meta);
        Ok(())
    }
}

impl fmt::Debug for EndpointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointGroup")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// The registration root.
///
/// Dereferences to the root [`EndpointGroup`], so every group operation is
/// available on the router itself.
#[derive(Debug, Clone)]
pub struct Router {
    root: EndpointGroup,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// A router with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(RouterConfig::default(), JsonCodec::new())
    }

    /// A router with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an invalid default status.
    pub fn with_config(config: RouterConfig) -> Result<Self, ConfigError> {
        let codec = match config.success_status()? {
            Some(status) => JsonCodec::new().with_status(status),
            None => JsonCodec::new(),
        };
        Ok(Self::from_parts(config, codec))
    }

    fn from_parts(config: RouterConfig, default_codec: JsonCodec) -> Self {
        let state = State {
            groups: vec![GroupNode {
                prefix: String::new(),
                parent: None,
                middleware: Vec::new(),
            }],
            endpoints: Vec::new(),
            metas: Vec::new(),
            fallback: None,
            first_error: None,
            built: None,
        };
        Self {
            root: EndpointGroup {
                shared: Arc::new(Shared {
                    state: Mutex::new(state),
                    config,
                    default_codec,
                }),
                index: ROOT,
                prefix: String::new(),
            },
        }
    }

    /// The router configuration.
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.root.shared.config
    }

    /// Sets the handler for requests that match no route. It is wrapped by
    /// the root group's middleware.
    pub fn set_fallback(&self, handler: HttpHandler) -> Result<(), RegistrationError> {
        let mut state = self.root.shared.state.lock();
        if state.is_sealed() {
            warn!("fallback set after build rejected");
            return Err(RegistrationError::SealedGroup {
                prefix: String::new(),
            });
        }
        state.fallback = Some(handler);
        Ok(())
    }

    /// True once [`build`](Self::build) has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.root.shared.state.lock().is_sealed()
    }

    /// Seals the router and builds the dispatch service.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, or the first duplicate or
    /// ambiguous route. No partial service is produced.
    pub fn build(&self) -> Result<RpcService, BuildError> {
        let mut state = self.root.shared.state.lock();
        if let Some(built) = &state.built {
            return built.clone();
        }

        let built = self.compile(&state);
        match &built {
            Ok(service) => info!(
                routes = state.endpoints.len(),
                static_paths = service.static_paths(),
                pattern_paths = service.pattern_paths(),
                "router built"
            ),
            Err(err) => warn!(error = %err, "router build failed"),
        }
        state.built = Some(built.clone());
        built
    }

    fn compile(&self, state: &State) -> Result<RpcService, BuildError> {
        if let Some(err) = &state.first_error {
            return Err(err.clone().into());
        }

        let mut table = TableBuilder::new();
        for endpoint in &state.endpoints {
            let chain = collect(
                state
                    .ancestry(endpoint.group)
                    .map(|node| node.middleware.as_slice()),
            );
            debug!(
                method = %endpoint.method,
                path = endpoint.pattern.path(),
                group = state.groups.get(endpoint.group).map_or("", |node| node.prefix.as_str()),
                middleware = chain.len(),
                "composing endpoint"
            );
            let handler = apply(endpoint.handler.clone(), &chain);
            table.insert_pattern(endpoint.method.clone(), endpoint.pattern.clone(), handler)?;
        }

        let fallback = state.fallback.clone().map(|handler| {
            let root = state.groups.get(ROOT).map_or(&[][..], |node| node.middleware.as_slice());
            apply(handler, root)
        });

        Ok(RpcService::new(
            table.build(),
            fallback,
            state.endpoints.len(),
            self.root.shared.config.strip_trailing_slash,
        ))
    }

    /// Endpoint records in registration order.
    #[must_use]
    pub fn endpoint_metas(&self) -> Vec<EndpointMeta> {
        self.root.shared.state.lock().metas.clone()
    }

    /// Serializable endpoint descriptions in registration order.
    #[must_use]
    pub fn describe(&self) -> Vec<EndpointDescription> {
        self.root
            .shared
            .state
            .lock()
            .metas
            .iter()
            .map(EndpointDescription::from)
            .collect()
    }
}

impl Deref for Router {
    type Target = EndpointGroup;

    fn deref(&self) -> &EndpointGroup {
        &self.root
    }
}
