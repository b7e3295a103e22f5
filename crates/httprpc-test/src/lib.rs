//! # httprpc Test
//!
//! In-memory testing for httprpc services. Requests go straight into
//! [`RpcService::handle`](httprpc::RpcService::handle): no sockets, no
//! ports, but the full dispatch path including every middleware layer.
//!
//! ## Example
//!
//! ```rust,ignore
//! use httprpc_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_user() {
//!     let client = TestClient::from_router(&app_router()).unwrap();
//!
//!     let response = client
//!         .post("/v1/users")
//!         .header("X-Tenant", "acme")
//!         .json(&json!({ "name": "Alice" }))
//!         .send()
//!         .await;
//!
//!     response.assert_status(http::StatusCode::OK);
//!     assert_eq!(response.json_value().unwrap()["name"], "Alice");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/httprpc-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
