// ABOUTME: In-memory token store
// ABOUTME: HashMap behind a tokio RwLock, shared by cloning the handle

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use tessera_core::Token;

use crate::{StorageError, StorageResult, TokenStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    tokens: Arc<RwLock<HashMap<String, Token>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, token: &Token, max_per_user: Option<u32>) -> StorageResult<()> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token) {
            return Err(StorageError::Duplicate(token.token.clone()));
        }

        if let Some(max) = max_per_user {
            let held = tokens
                .values()
                .filter(|t| t.user_id == token.user_id)
                .count();
            if held >= max as usize {
                return Err(StorageError::LimitReached {
                    user_id: token.user_id.clone(),
                    max,
                });
            }
        }

        tokens.insert(token.token.clone(), token.clone());
        debug!(user_id = %token.user_id, "Token stored in memory");
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Token>> {
        Ok(self.tokens.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let removed = self.tokens.write().await.remove(id).is_some();
        debug!(removed, "Token delete in memory");
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<Token>> {
        let mut owned: Vec<Token> = self
            .tokens
            .read()
            .await
            .values()
            .filter(|t| t.is_owned_by(user_id))
            .cloned()
            .collect();

        owned.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.token.cmp(&b.token))
        });
        Ok(owned)
    }

    async fn count_by_user(&self, user_id: &str) -> StorageResult<u64> {
        let count = self
            .tokens
            .read()
            .await
            .values()
            .filter(|t| t.is_owned_by(user_id))
            .count();
        Ok(count as u64)
    }
}
