//! Building routers from TOML configuration.

use http::StatusCode;
use httprpc::prelude::*;
use httprpc::{ConfigError, HttpRpcConfig};
use httprpc_test::TestClient;

async fn created(_ctx: RequestContext, _req: Empty) -> Result<Empty, HandlerError> {
    Ok(Empty {})
}

#[tokio::test]
async fn router_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("service.toml");
    std::fs::write(
        &path,
        r#"
        [router]
        strip_trailing_slash = false
        default_success_status = 201

        [logging]
        level = "warn"
        format = "compact"
        "#,
    )
    .unwrap();

    let config = HttpRpcConfig::from_file(&path).unwrap();
    let router = Router::with_config(config.router.clone()).unwrap();
    assert_eq!(router.config(), &config.router);

    router
        .register(Endpoint::<Empty, Empty>::post("/things"), created)
        .unwrap();
    let client = TestClient::from_router(&router).unwrap();

    client.post("/things").send().await.assert_status(StatusCode::CREATED);
    client.post("/things/").send().await.assert_status(StatusCode::NOT_FOUND);
}

#[test]
fn invalid_status_is_rejected_before_building() {
    let config = HttpRpcConfig::from_toml_str("[router]\ndefault_success_status = 302\n");
    assert!(matches!(config, Err(ConfigError::InvalidValue { ref field, .. }) if field == "router.default_success_status"));
}
