// ABOUTME: Token store abstraction and its persistence backends
// ABOUTME: In-memory store for tests and single-process use, SQLite for durable deployments

use async_trait::async_trait;
use thiserror::Error;

use tessera_core::Token;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Token already exists: {0}")]
    Duplicate(String),
    #[error("User {user_id} already holds the maximum of {max} tokens")]
    LimitReached { user_id: String, max: u32 },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for issued tokens, keyed by the token string.
///
/// All operations take `&self` so a store can be shared as
/// `Arc<dyn TokenStore>` across request handlers.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Insert a token. With `max_per_user`, the insert fails with
    /// `LimitReached` when the owner already holds that many tokens; the
    /// check and the insert happen atomically.
    async fn create(&self, token: &Token, max_per_user: Option<u32>) -> StorageResult<()>;

    /// Look up a token. Unknown ids are `Ok(None)`.
    async fn get(&self, id: &str) -> StorageResult<Option<Token>>;

    /// Remove a token if present. Deleting an unknown id is a no-op.
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Tokens owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<Token>>;

    async fn count_by_user(&self, user_id: &str) -> StorageResult<u64>;
}
