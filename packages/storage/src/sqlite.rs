// ABOUTME: SQLite-backed token store
// ABOUTME: Pool setup, embedded migrations, and row mapping for the tokens table

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{migrate::MigrateDatabase, Row};
use tracing::{debug, info};

use tessera_core::Token;

use crate::{StorageError, StorageResult, TokenStore};

/// SQLite implementation of TokenStore
#[derive(Debug, Clone)]
pub struct SqliteTokenStore {
    pool: SqlitePool,
}

impl SqliteTokenStore {
    /// Open (creating if needed) the database file at `path` and apply
    /// migrations.
    pub async fn connect(path: &Path, max_connections: u32) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let database_url = format!("sqlite:{}", path.display());

        if !sqlx::Sqlite::database_exists(&database_url).await? {
            debug!("Creating database at: {}", database_url);
            sqlx::Sqlite::create_database(&database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await?;

        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;

        info!(path = %path.display(), "Opened SQLite token store");
        Self::from_pool(pool).await
    }

    /// Private in-memory database. Pinned to one connection that is never
    /// reaped, since every SQLite memory connection is its own database.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, applying migrations first
    pub async fn from_pool(pool: SqlitePool) -> StorageResult<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    fn row_to_token(row: &SqliteRow) -> StorageResult<Token> {
        Ok(Token {
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            policy_name: row.try_get("policy_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn create(&self, token: &Token, max_per_user: Option<u32>) -> StorageResult<()> {
        let result = match max_per_user {
            Some(max) => {
                // Single statement so the count and the insert cannot interleave
                // with another writer.
                sqlx::query(
                    "INSERT INTO tokens (token, user_id, policy_name, created_at)
                     SELECT ?, ?, ?, ?
                     WHERE (SELECT COUNT(*) FROM tokens WHERE user_id = ?) < ?",
                )
                .bind(&token.token)
                .bind(&token.user_id)
                .bind(&token.policy_name)
                .bind(token.created_at)
                .bind(&token.user_id)
                .bind(i64::from(max))
                .execute(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "INSERT INTO tokens (token, user_id, policy_name, created_at)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&token.token)
                .bind(&token.user_id)
                .bind(&token.policy_name)
                .bind(token.created_at)
                .execute(&self.pool)
                .await
            }
        };

        let result = result.map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::Duplicate(token.token.clone())
            } else {
                StorageError::Sqlx(e)
            }
        })?;

        if result.rows_affected() == 0 {
            if let Some(max) = max_per_user {
                return Err(StorageError::LimitReached {
                    user_id: token.user_id.clone(),
                    max,
                });
            }
        }

        debug!(user_id = %token.user_id, "Token stored in SQLite");
        Ok(())
    }

    async fn get(&self, id: &str) -> StorageResult<Option<Token>> {
        let row = sqlx::query(
            "SELECT token, user_id, policy_name, created_at
             FROM tokens
             WHERE token = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM tokens WHERE token = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Token delete in SQLite");
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> StorageResult<Vec<Token>> {
        let rows = sqlx::query(
            "SELECT token, user_id, policy_name, created_at
             FROM tokens
             WHERE user_id = ?
             ORDER BY created_at DESC, token ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn count_by_user(&self, user_id: &str) -> StorageResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count as u64)
    }
}
