// ABOUTME: Token service combining a store with the policy registry
// ABOUTME: Shared by the HTTP handlers and the command line

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use tessera_core::{
    generate_token, validate_token_id, PolicyRegistry, ProviderContext, Token, ValidationError,
};
use tessera_storage::{StorageError, TokenStore};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token id: {0}")]
    InvalidId(#[from] ValidationError),
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type TokenResult<T> = Result<T, TokenError>;

pub struct TokenApi {
    store: Arc<dyn TokenStore>,
    policies: PolicyRegistry,
}

impl TokenApi {
    pub fn new(store: Arc<dyn TokenStore>, policies: PolicyRegistry) -> Self {
        Self { store, policies }
    }

    /// Issue a new token for the caller under the caller's policy
    pub async fn create(&self, ctx: &ProviderContext) -> TokenResult<Token> {
        let policy = self
            .policies
            .get(&ctx.policy_name)
            .ok_or_else(|| TokenError::UnknownPolicy(ctx.policy_name.clone()))?;

        let token = Token::new(
            generate_token(),
            ctx.user_id.clone(),
            policy.name.clone(),
        );
        self.store.create(&token, Some(policy.max_tokens)).await?;

        info!(user_id = %ctx.user_id, policy = %policy.name, "Issued token");
        Ok(token)
    }

    /// Unscoped lookup. Malformed ids cannot exist in the store and
    /// resolve to `None`.
    pub async fn get(&self, id: &str) -> TokenResult<Option<Token>> {
        if validate_token_id(id).is_err() {
            return Ok(None);
        }
        Ok(self.store.get(id).await?)
    }

    /// Lookup restricted to tokens owned by the caller
    pub async fn get_owned(&self, ctx: &ProviderContext, id: &str) -> TokenResult<Option<Token>> {
        validate_token_id(id)?;
        let token = self.store.get(id).await?;
        Ok(token.filter(|t| t.is_owned_by(&ctx.user_id)))
    }

    pub async fn list(&self, ctx: &ProviderContext) -> TokenResult<Vec<Token>> {
        Ok(self.store.list_by_user(&ctx.user_id).await?)
    }

    /// Idempotent delete. Once this returns, `get(id)` is `None`.
    pub async fn delete(&self, id: &str) -> TokenResult<()> {
        validate_token_id(id)?;
        self.store.delete(id).await?;
        debug!(token_id = %id, "Token deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Policy;
    use tessera_storage::MemoryTokenStore;

    fn api() -> TokenApi {
        let policies =
            PolicyRegistry::new([Policy::new("free", 2), Policy::new("pro", 5)]).unwrap();
        TokenApi::new(Arc::new(MemoryTokenStore::new()), policies)
    }

    #[tokio::test]
    async fn test_create_uses_caller_identity() {
        let api = api();
        let ctx = ProviderContext::new("hip", "pro");

        let token = api.create(&ctx).await.unwrap();
        assert_eq!(token.user_id, "hip");
        assert_eq!(token.policy_name, "pro");
        assert_eq!(api.get(&token.token).await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_policy() {
        let api = api();
        let err = api
            .create(&ProviderContext::new("hip", "enterprise"))
            .await
            .unwrap_err();
        assert!(matches!(err, TokenError::UnknownPolicy(name) if name == "enterprise"));
    }

    #[tokio::test]
    async fn test_create_enforces_policy_cap() {
        let api = api();
        let ctx = ProviderContext::new("hip", "free");

        api.create(&ctx).await.unwrap();
        api.create(&ctx).await.unwrap();
        let err = api.create(&ctx).await.unwrap_err();
        assert!(matches!(
            err,
            TokenError::Storage(StorageError::LimitReached { max: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_owned_hides_foreign_tokens() {
        let api = api();
        let token = api.create(&ProviderContext::new("hip", "free")).await.unwrap();

        let other = ProviderContext::new("hop", "free");
        assert_eq!(api.get_owned(&other, &token.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_none() {
        assert_eq!(api().get("not a token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let api = api();
        let token = api.create(&ProviderContext::new("hip", "free")).await.unwrap();

        api.delete(&token.token).await.unwrap();
        api.delete(&token.token).await.unwrap();
        assert_eq!(api.get(&token.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_id() {
        let err = api().delete("a/b").await.unwrap_err();
        assert!(matches!(err, TokenError::InvalidId(_)));
    }
}
