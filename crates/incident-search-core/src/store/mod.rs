//! Key-value storage abstraction.
//!
//! The application persists a single string value per key (the history
//! snapshot). The [`KeyValueStore`] trait keeps that persistence pluggable:
//! SQLite in the application crate, in-memory for tests.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

/// String-keyed, string-valued store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
