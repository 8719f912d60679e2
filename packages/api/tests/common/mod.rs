// ABOUTME: Common test utilities for token management integration tests
// ABOUTME: Boots a router over an in-memory store with a fixture token issued

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use tessera_api::{manage, AuthProvider, StaticProvider, TokenApi, TokenState};
use tessera_core::{Policy, PolicyRegistry, ProviderContext};
use tessera_storage::MemoryTokenStore;

/// Booted application plus handles for post-condition checks
pub struct TestContext {
    pub app: Router,
    pub api: Arc<TokenApi>,
    /// Token issued to the provider's user before each test
    pub fixture_token: String,
}

/// Boot with a provider answering `hip` on the `free` policy
pub async fn setup() -> TestContext {
    setup_with_provider(Arc::new(StaticProvider::new("hip", "free"))).await
}

pub async fn setup_with_provider(provider: Arc<dyn AuthProvider>) -> TestContext {
    let policies = PolicyRegistry::new([Policy::new("free", 3), Policy::new("pro", 10)])
        .expect("valid policies");
    let api = Arc::new(TokenApi::new(Arc::new(MemoryTokenStore::new()), policies));

    let fixture = api
        .create(&ProviderContext::new("hip", "free"))
        .await
        .expect("Failed to create fixture token");

    let app = manage(Router::new(), TokenState::new(api.clone(), provider));

    TestContext {
        app,
        api,
        fixture_token: fixture.token,
    }
}

/// Send a JSON-typed request with an empty body
pub async fn send(app: &Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::empty())
        .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
