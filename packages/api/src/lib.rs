// ABOUTME: HTTP token management layer for Tessera
// ABOUTME: Mounts the /token routes onto an application router

use std::sync::Arc;

use axum::{extract::FromRef, routing::get, Router};

pub mod auth;
pub mod error;
pub mod handlers;
pub mod response;
pub mod service;

pub use auth::{AuthError, AuthProvider, HeaderProvider, Provided, StaticProvider};
pub use error::{ApiResult, AppError};
pub use response::ApiResponse;
pub use service::{TokenApi, TokenError, TokenResult};

/// State shared by the token management handlers
#[derive(Clone)]
pub struct TokenState {
    pub api: Arc<TokenApi>,
    pub provider: Arc<dyn AuthProvider>,
}

impl TokenState {
    pub fn new(api: Arc<TokenApi>, provider: Arc<dyn AuthProvider>) -> Self {
        Self { api, provider }
    }
}

impl FromRef<TokenState> for Arc<TokenApi> {
    fn from_ref(state: &TokenState) -> Self {
        state.api.clone()
    }
}

impl FromRef<TokenState> for Arc<dyn AuthProvider> {
    fn from_ref(state: &TokenState) -> Self {
        state.provider.clone()
    }
}

/// Creates the token management router
pub fn create_token_router() -> Router<TokenState> {
    Router::new()
        .route("/token", get(handlers::list_tokens).post(handlers::create_token))
        .route("/token/{id}", get(handlers::get_token).delete(handlers::delete_token))
}

/// Mount the token management routes onto `app`
pub fn manage(app: Router, state: TokenState) -> Router {
    app.merge(create_token_router().with_state(state))
}
