//! Per-path handler set keyed by HTTP method.
//!
//! Each path bucket in the dispatch table owns one [`MethodSet`]. Once the
//! table is frozen the set also carries a precomputed `Allow` header value
//! listing its registered methods in ascending order.

use http::Method;

/// Number of methods in [`SUPPORTED_METHODS`].
pub const METHOD_COUNT: usize = 7;

/// The supported verb set, in ascending lexical order.
///
/// Iterating in this order yields a sorted `Allow` header without a sort.
pub static SUPPORTED_METHODS: [Method; METHOD_COUNT] = [
    Method::DELETE,
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::POST,
    Method::PUT,
];

/// Returns the slot index of a supported method.
fn slot(method: &Method) -> Option<usize> {
    SUPPORTED_METHODS.iter().position(|m| m == method)
}

/// Returns true if `method` belongs to the supported verb set.
#[must_use]
pub fn is_supported(method: &Method) -> bool {
    slot(method).is_some()
}

/// Handlers for one path, one slot per supported method.
///
/// # Example
///
/// ```rust
/// use httprpc_router::MethodSet;
/// use http::Method;
///
/// let mut set = MethodSet::new();
/// set.insert(&Method::POST, "create").unwrap();
/// set.insert(&Method::GET, "list").unwrap();
/// set.freeze();
///
/// assert_eq!(set.get(&Method::GET), Some(&"list"));
/// assert_eq!(set.allow(), "GET, POST");
/// ```
#[derive(Debug, Clone)]
pub struct MethodSet<H> {
    slots: [Option<H>; METHOD_COUNT],
    allow: String,
}

impl<H> Default for MethodSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a handler could not be added to a [`MethodSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// The method is outside [`SUPPORTED_METHODS`].
    Unsupported,
    /// A handler is already registered for the method.
    Occupied,
}

impl<H> MethodSet<H> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            allow: String::new(),
        }
    }

    /// Registers `handler` for `method`, never overwriting an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::Occupied`] if the method already has a handler
    /// and [`InsertError::Unsupported`] for methods outside the verb set.
    pub fn insert(&mut self, method: &Method, handler: H) -> Result<(), InsertError> {
        let index = slot(method).ok_or(InsertError::Unsupported)?;
        let entry = &mut self.slots[index];
        if entry.is_some() {
            return Err(InsertError::Occupied);
        }
        *entry = Some(handler);
        Ok(())
    }

    /// Returns the handler registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&H> {
        slot(method).and_then(|index| self.slots[index].as_ref())
    }

    /// Returns the registered methods in ascending order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&'static Method> {
        SUPPORTED_METHODS
            .iter()
            .zip(&self.slots)
            .filter_map(|(method, handler)| handler.as_ref().map(|_| method))
            .collect()
    }

    /// Returns true if any method is registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Computes the `Allow` header value.
    pub fn freeze(&mut self) {
        self.allow = self
            .allowed_methods()
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
    }

    /// The `Allow` header value computed by [`freeze`](Self::freeze).
    #[must_use]
    pub fn allow(&self) -> &str {
        &self.allow
    }
}
