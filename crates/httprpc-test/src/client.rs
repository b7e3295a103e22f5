//! In-memory client over an [`RpcService`].

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;
use http::Method;
use httprpc::{BuildError, Router, RpcService};
use httprpc_middleware::Request;
use serde::Serialize;

/// Sends requests to an [`RpcService`] without a network.
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    service: RpcService,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// A client for an already built service.
    pub fn new(service: RpcService) -> Self {
        Self {
            service,
            default_headers: Vec::new(),
        }
    }

    /// Builds `router` and wraps the service.
    ///
    /// # Errors
    ///
    /// Returns the router's build error.
    pub fn from_router(router: &Router) -> Result<Self, BuildError> {
        router.build().map(Self::new)
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The wrapped service.
    pub fn service(&self) -> &RpcService {
        &self.service
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        let mut builder = TestRequest::new(method, uri);
        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }
        TestClientRequest {
            client: self,
            builder,
        }
    }

    /// Dispatches a prepared transport request.
    pub async fn dispatch(&self, request: Request) -> TestResponse {
        TestResponse::from_response(self.service.handle(request).await).await
    }
}

/// A request being built against a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequest,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the query string from a serializable value.
    pub fn query<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.query(value);
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sends the request.
    ///
    /// # Errors
    ///
    /// Returns the builder's error; dispatch itself cannot fail.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.builder.build()?;
        Ok(self.client.dispatch(request).await)
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(err) => panic!("failed to build test request: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use httprpc::Endpoint;
    use httprpc_core::{Empty, HandlerError, RequestContext};

    async fn whoami(ctx: RequestContext, _req: Empty) -> Result<String, HandlerError> {
        Ok(ctx.route().unwrap_or("-").to_string())
    }

    fn client() -> TestClient {
        let router = Router::new();
        router
            .register(Endpoint::<Empty, String>::get("/whoami"), whoami)
            .unwrap();
        TestClient::from_router(&router).unwrap()
    }

    #[tokio::test]
    async fn test_dispatches_through_service() {
        let response = client().get("/whoami").send().await;
        response
            .assert_status(StatusCode::OK)
            .assert_body("\"/whoami\"\n");
    }

    #[tokio::test]
    async fn test_build_error_surfaces_from_try_send() {
        let result = client().get("/whoami").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = client().post("/nowhere").send().await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
