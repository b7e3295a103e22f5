//! Endpoint descriptors and registration options.
//!
//! An [`Endpoint`] names a method, a path and the request/response types of
//! a handler. [`MetaEndpoint`] adds a metadata type bound from path
//! parameters and headers.
//!
//! ```
//! use httprpc::{Endpoint, MetaEndpoint};
//! use httprpc_core::Empty;
//!
//! let list: Endpoint<Empty, Vec<String>> = Endpoint::get("/products");
//! let fetch: MetaEndpoint<Empty, (), String> = MetaEndpoint::get("/products/:product_id");
//! assert_eq!(list.path(), "/products");
//! assert_eq!(fetch.method(), http::Method::GET);
//! ```

use http::Method;
use httprpc_core::{BoxedHandler, BoxedMetaHandler, TypedMiddleware};
use httprpc_extract::Codec;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

macro_rules! verb_constructors {
    ($($(#[$doc:meta])* $name:ident => $method:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $name(path: impl Into<String>) -> Self {
                Self::new(Method::$method, path)
            }
        )+
    };
}

/// A typed endpoint without metadata.
pub struct Endpoint<Req, Res> {
    method: Method,
    path: String,
    _types: PhantomData<fn(Req) -> Res>,
}

impl<Req, Res> Endpoint<Req, Res> {
    /// An endpoint for `method` at `path`, relative to the group it is
    /// registered on.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            _types: PhantomData,
        }
    }

    verb_constructors! {
        /// A `GET` endpoint.
        get => GET,
        /// A `POST` endpoint.
        post => POST,
        /// A `PUT` endpoint.
        put => PUT,
        /// A `DELETE` endpoint.
        delete => DELETE,
        /// A `PATCH` endpoint.
        patch => PATCH,
        /// An `OPTIONS` endpoint.
        options => OPTIONS,
        /// A `HEAD` endpoint.
        head => HEAD,
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method.clone()
    }

    /// The path relative to the registering group.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<Req, Res> fmt::Debug for Endpoint<Req, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// A typed endpoint whose handler also receives `Meta`.
pub struct MetaEndpoint<Req, Meta, Res> {
    method: Method,
    path: String,
    _types: PhantomData<fn(Req, Meta) -> Res>,
}

impl<Req, Meta, Res> MetaEndpoint<Req, Meta, Res> {
    /// A meta-aware endpoint for `method` at `path`.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            _types: PhantomData,
        }
    }

    verb_constructors! {
        /// A `GET` endpoint.
        get => GET,
        /// A `POST` endpoint.
        post => POST,
        /// A `PUT` endpoint.
        put => PUT,
        /// A `DELETE` endpoint.
        delete => DELETE,
        /// A `PATCH` endpoint.
        patch => PATCH,
        /// An `OPTIONS` endpoint.
        options => OPTIONS,
        /// A `HEAD` endpoint.
        head => HEAD,
    }

    /// The HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method.clone()
    }

    /// The path relative to the registering group.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl<Req, Meta, Res> fmt::Debug for MetaEndpoint<Req, Meta, Res> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaEndpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// Per-endpoint options: a codec override and typed middleware.
///
/// `H` is the boxed handler type the typed middleware wraps. The first
/// middleware added becomes the outermost layer.
pub struct RegisterOptions<Req, Res, H = BoxedHandler<Req, Res>> {
    pub(crate) codec: Option<Arc<dyn Codec<Req, Res>>>,
    pub(crate) middleware: Vec<TypedMiddleware<H>>,
}

/// Options for a [`MetaEndpoint`].
pub type MetaRegisterOptions<Req, Meta, Res> =
    RegisterOptions<Req, Res, BoxedMetaHandler<Req, Meta, Res>>;

impl<Req, Res, H> RegisterOptions<Req, Res, H> {
    /// Options using the router's default codec and no typed middleware.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: None,
            middleware: Vec::new(),
        }
    }

    /// Uses `codec` instead of the default JSON codec.
    #[must_use]
    pub fn codec(mut self, codec: impl Codec<Req, Res>) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Appends a typed middleware.
    #[must_use]
    pub fn middleware(mut self, middleware: TypedMiddleware<H>) -> Self {
        self.middleware.push(middleware);
        self
    }
}

impl<Req, Res, H> Default for RegisterOptions<Req, Res, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Res, H> fmt::Debug for RegisterOptions<Req, Res, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterOptions")
            .field("custom_codec", &self.codec.is_some())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
