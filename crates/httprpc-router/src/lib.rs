//! Route compilation and dispatch for httprpc.
//!
//! This crate turns registered paths into an immutable [`DispatchTable`]
//! that resolves an incoming method and path to a handler.
//!
//! # Features
//!
//! - **Colon Parameters**: single-segment captures written `:name`, with
//!   snake_case names
//! - **Static Fast Path**: non-parameterized paths resolve by exact match
//! - **Conflict Detection**: duplicate method+path and ambiguous pattern
//!   shapes are rejected while the table is built
//! - **Allow Header**: every path bucket precomputes its sorted `Allow` value
//!
//! # Example
//!
//! ```rust
//! use httprpc_router::{Lookup, TableBuilder};
//! use http::Method;
//!
//! let mut builder = TableBuilder::new();
//! builder.insert(Method::GET, "/users", "listUsers").unwrap();
//! builder.insert(Method::POST, "/users", "createUser").unwrap();
//! builder.insert(Method::GET, "/users/:id", "getUser").unwrap();
//! let table = builder.build();
//!
//! match table.lookup(&Method::GET, "/users/123") {
//!     Lookup::Found { handler, params, .. } => {
//!         assert_eq!(*handler, "getUser");
//!         assert_eq!(params.get("id"), Some("123"));
//!     }
//!     _ => unreachable!(),
//! }
//!
//! match table.lookup(&Method::DELETE, "/users") {
//!     Lookup::MethodNotAllowed { allow } => assert_eq!(allow, "GET, POST"),
//!     _ => unreachable!(),
//! }
//! ```
//!
//! # Shapes
//!
//! A pattern's shape replaces every parameter segment with `:`:
//!
//! ```text
//!   /users/:id            ->  /users/:
//!   /users/:user_id       ->  /users/:      (ambiguous with the above)
//!   /orgs/:org_id/users   ->  /orgs/:/users
//! ```

mod error;
mod method_set;
mod params;
mod pattern;
mod table;

pub use error::RouteError;
pub use method_set::{is_supported, InsertError, MethodSet, METHOD_COUNT, SUPPORTED_METHODS};
pub use params::Params;
pub use pattern::{is_snake_case, RoutePattern, Segment, PARAM_MARKER};
pub use table::{DispatchTable, Lookup, TableBuilder};
