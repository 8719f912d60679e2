// ABOUTME: Pluggable identity and policy resolution for management requests
// ABOUTME: AuthProvider implementations and the extractor that invokes them

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use thiserror::Error;
use tracing::warn;

use tessera_core::ProviderContext;

use crate::error::AppError;

/// Header carrying the caller's user id when behind a trusted gateway
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the caller's policy name when behind a trusted gateway
pub const POLICY_NAME_HEADER: &str = "X-Policy-Name";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No caller identity on request")]
    MissingIdentity,
    #[error("Caller identity rejected: {0}")]
    Rejected(String),
}

/// Resolves who is calling and under which policy. Invoked before every
/// management handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn provide(&self, parts: &Parts) -> Result<ProviderContext, AuthError>;
}

/// Always answers with the same caller. Suits single-tenant deployments.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    context: ProviderContext,
}

impl StaticProvider {
    pub fn new(user_id: impl Into<String>, policy_name: impl Into<String>) -> Self {
        Self {
            context: ProviderContext::new(user_id, policy_name),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticProvider {
    async fn provide(&self, _parts: &Parts) -> Result<ProviderContext, AuthError> {
        Ok(self.context.clone())
    }
}

/// Reads the caller from headers set by an upstream gateway. Only safe
/// when the gateway strips these headers from client traffic.
#[derive(Debug, Clone)]
pub struct HeaderProvider {
    default_policy: String,
}

impl HeaderProvider {
    pub fn new(default_policy: impl Into<String>) -> Self {
        Self {
            default_policy: default_policy.into(),
        }
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl AuthProvider for HeaderProvider {
    async fn provide(&self, parts: &Parts) -> Result<ProviderContext, AuthError> {
        let user_id = header_value(parts, USER_ID_HEADER).ok_or(AuthError::MissingIdentity)?;
        let policy_name =
            header_value(parts, POLICY_NAME_HEADER).unwrap_or(self.default_policy.as_str());

        Ok(ProviderContext::new(user_id, policy_name))
    }
}

/// Extractor yielding the caller resolved by the configured provider
#[derive(Debug, Clone)]
pub struct Provided(pub ProviderContext);

impl<S> FromRequestParts<S> for Provided
where
    Arc<dyn AuthProvider>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let provider = Arc::<dyn AuthProvider>::from_ref(state);

        match provider.provide(parts).await {
            Ok(ctx) => Ok(Provided(ctx)),
            Err(e) => {
                warn!(path = %parts.uri.path(), error = %e, "Provider refused request");
                Err(AppError::Unauthorized {
                    message: e.to_string(),
                })
            }
        }
    }
}
