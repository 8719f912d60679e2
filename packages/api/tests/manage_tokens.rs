// ABOUTME: Tests for listing, issuing, and showing tokens
// ABOUTME: Covers policy caps, owner scoping, and provider refusal

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use mockall::mock;
use pretty_assertions::assert_eq;

use common::{body_json, send, setup, setup_with_provider};
use tessera_api::{AuthError, AuthProvider};
use tessera_core::ProviderContext;

mock! {
    pub Provider {}

    #[async_trait::async_trait]
    impl AuthProvider for Provider {
        async fn provide(
            &self,
            parts: &axum::http::request::Parts,
        ) -> Result<ProviderContext, AuthError>;
    }
}

#[tokio::test]
async fn test_list_returns_caller_tokens() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::GET, "/token").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["token"], ctx.fixture_token.as_str());
    assert_eq!(body["data"][0]["userId"], "hip");
    assert_eq!(body["data"][0]["policyName"], "free");
}

#[tokio::test]
async fn test_create_returns_201_and_persists() {
    let ctx = setup().await;

    let response = send(&ctx.app, Method::POST, "/token").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 43);

    let stored = ctx.api.get(&token).await.unwrap().unwrap();
    assert_eq!(stored.user_id, "hip");
}

#[tokio::test]
async fn test_create_stops_at_policy_cap() {
    let ctx = setup().await;

    // Fixture holds one of the three free slots
    for _ in 0..2 {
        let response = send(&ctx.app, Method::POST, "/token").await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&ctx.app, Method::POST, "/token").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_LIMIT_REACHED");

    // Deleting frees a slot
    let uri = format!("/token/{}", ctx.fixture_token);
    assert_eq!(
        send(&ctx.app, Method::DELETE, &uri).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        send(&ctx.app, Method::POST, "/token").await.status(),
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn test_show_own_token() {
    let ctx = setup().await;

    let response = send(
        &ctx.app,
        Method::GET,
        &format!("/token/{}", ctx.fixture_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["token"], ctx.fixture_token.as_str());
}

#[tokio::test]
async fn test_show_deleted_token_is_404() {
    let ctx = setup().await;
    let uri = format!("/token/{}", ctx.fixture_token);

    send(&ctx.app, Method::DELETE, &uri).await;

    let response = send(&ctx.app, Method::GET, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_policy_returns_400() {
    let mut provider = MockProvider::new();
    provider
        .expect_provide()
        .returning(|_| Ok(ProviderContext::new("hip", "enterprise")));
    let ctx = setup_with_provider(Arc::new(provider)).await;

    let response = send(&ctx.app, Method::POST, "/token").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_runs_once_per_request() {
    let mut provider = MockProvider::new();
    provider
        .expect_provide()
        .times(2)
        .returning(|_| Ok(ProviderContext::new("hip", "free")));
    let ctx = setup_with_provider(Arc::new(provider)).await;

    send(&ctx.app, Method::GET, "/token").await;
    send(
        &ctx.app,
        Method::DELETE,
        &format!("/token/{}", ctx.fixture_token),
    )
    .await;
}

#[tokio::test]
async fn test_provider_refusal_returns_401_without_detail() {
    let mut provider = MockProvider::new();
    provider
        .expect_provide()
        .returning(|_| Err(AuthError::Rejected("session secret expired".to_string())));
    let ctx = setup_with_provider(Arc::new(provider)).await;

    let response = send(&ctx.app, Method::GET, "/token").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(!body.to_string().contains("secret"));
}
