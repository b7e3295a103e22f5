//! Registration and build errors.

use http::Method;
use httprpc_extract::MetaShapeError;
use httprpc_router::RouteError;
use thiserror::Error;

/// An endpoint or middleware could not be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The router was already built.
    #[error("cannot register {method} {path}: router is sealed")]
    Sealed {
        /// Method of the rejected endpoint.
        method: Method,
        /// Full path of the rejected endpoint.
        path: String,
    },

    /// A group was modified after the router was built.
    #[error("cannot modify endpoint group {prefix:?}: router is sealed")]
    SealedGroup {
        /// Effective prefix of the group.
        prefix: String,
    },

    /// The endpoint path is not a valid route.
    #[error(transparent)]
    InvalidPath(#[from] RouteError),

    /// The metadata type does not fit the route.
    #[error(transparent)]
    InvalidMeta(#[from] MetaShapeError),
}

/// The router could not be built.
///
/// Building is attempted once. Every later call returns the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two routes conflict.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// An earlier registration failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}
