//! Priority-ordered middleware composition.
//!
//! Each endpoint group owns an ordered list of [`MiddlewareEntry`] values.
//! For one endpoint the effective chain is built in two steps:
//!
//! 1. [`collect`] concatenates the entries of the endpoint's group, then its
//!    parent's, up to the root (leaf first, each group in registration
//!    order).
//! 2. [`apply`] stably sorts that list by ascending priority and wraps the
//!    handler with each entry in turn. The last entry applied is outermost.
//!
//! The outcome: higher priority runs earlier, and for equal priority an
//! ancestor group's middleware runs before a descendant's.
//!
//! ```text
//!   root:  root-high (10), root-low (0)
//!   child: group (0)
//!
//!   collected:  group, root-high, root-low
//!   sorted:     group(0), root-low(0), root-high(10)
//!   request  -> root-high -> root-low -> group -> handler
//! ```

use crate::middleware::{wrap, HttpHandler, Middleware};
use std::sync::Arc;
use tracing::debug;

/// A middleware and the priority it was registered with.
#[derive(Clone)]
pub struct MiddlewareEntry {
    middleware: Arc<dyn Middleware>,
    priority: i32,
}

impl MiddlewareEntry {
    /// Creates an entry with the given priority.
    pub fn new(middleware: impl Middleware, priority: i32) -> Self {
        Self {
            middleware: Arc::new(middleware),
            priority,
        }
    }

    /// Creates an entry from an already shared middleware.
    #[must_use]
    pub fn from_arc(middleware: Arc<dyn Middleware>, priority: i32) -> Self {
        Self {
            middleware,
            priority,
        }
    }

    /// The registered priority. Higher runs earlier.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// The middleware's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.middleware.name()
    }
}

impl std::fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .finish()
    }
}

/// Concatenates per-group entry lists given leaf first.
pub fn collect<'a, I>(groups_leaf_to_root: I) -> Vec<MiddlewareEntry>
where
    I: IntoIterator<Item = &'a [MiddlewareEntry]>,
{
    groups_leaf_to_root
        .into_iter()
        .flat_map(|entries| entries.iter().cloned())
        .collect()
}

/// Wraps `handler` with `entries`, stably sorted by ascending priority.
pub fn apply(handler: HttpHandler, entries: &[MiddlewareEntry]) -> HttpHandler {
    if entries.is_empty() {
        return handler;
    }

    let mut ordered = entries.to_vec();
    ordered.sort_by_key(MiddlewareEntry::priority);

    debug!(
        chain = ?ordered.iter().rev().map(MiddlewareEntry::name).collect::<Vec<_>>(),
        "composed middleware chain, outermost first"
    );

    ordered
        .into_iter()
        .fold(handler, |inner, entry| wrap(entry.middleware, inner))
}
