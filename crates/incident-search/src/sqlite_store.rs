//! SQLite-backed [`KeyValueStore`] implementation.
//!
//! One row per key in the `kv` table. Writes are upserts stamped with the
//! current time.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

use incident_search_core::store::KeyValueStore;

use crate::config::Config;
use crate::{db, migrate};

/// SQLite implementation of the [`KeyValueStore`] trait.
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::create_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.db.path = dir.path().join("data").join("kv.sqlite");
        config
    }

    #[tokio::test]
    async fn upsert_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let store = SqliteKvStore::open(&config_in(&tmp)).await.unwrap();

        assert_eq!(store.get("searchHistory").await.unwrap(), None);
        store.set("searchHistory", "[]").await.unwrap();
        store.set("searchHistory", "[1]").await.unwrap();
        assert_eq!(
            store.get("searchHistory").await.unwrap().as_deref(),
            Some("[1]")
        );
        store.close().await;
    }

    #[tokio::test]
    async fn values_survive_reconnect() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);

        let store = SqliteKvStore::open(&config).await.unwrap();
        store.set("k", "v").await.unwrap();
        store.close().await;

        migrate::run_migrations(&config).await.unwrap();
        let store = SqliteKvStore::open(&config).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        store.close().await;
    }
}
