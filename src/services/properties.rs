//! Per-identity key/value property storage.
//!
//! DESIGN
//! ======
//! Properties are scoped to an identity (the cookie-bound user context) and
//! live outside the request. `PropertyStore` is the seam: handlers only see
//! `Arc<dyn PropertyStore>` from `AppState`, so the in-memory store used in
//! development and tests can be swapped for the Postgres-backed one.
//!
//! TRADE-OFFS
//! ==========
//! Writes are last-writer-wins. There is no versioning or compare-and-set;
//! two concurrent requests from the same identity race on the same key.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum PropertyStoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Identity-scoped key/value storage. Enables swapping backends in tests.
#[async_trait::async_trait]
pub trait PropertyStore: Send + Sync {
    /// Read a property, `None` when unset.
    async fn get_property(&self, identity: &str, key: &str) -> Result<Option<String>, PropertyStoreError>;

    /// Overwrite a property unconditionally.
    async fn set_property(&self, identity: &str, key: &str, value: &str) -> Result<(), PropertyStoreError>;

    /// Remove a property. Removing an unset key is not an error.
    async fn delete_property(&self, identity: &str, key: &str) -> Result<(), PropertyStoreError>;
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Process-local store. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryPropertyStore {
    inner: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl MemoryPropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PropertyStore for MemoryPropertyStore {
    async fn get_property(&self, identity: &str, key: &str) -> Result<Option<String>, PropertyStoreError> {
        let props = self.inner.read().await;
        Ok(props.get(identity).and_then(|p| p.get(key)).cloned())
    }

    async fn set_property(&self, identity: &str, key: &str, value: &str) -> Result<(), PropertyStoreError> {
        let mut props = self.inner.write().await;
        props
            .entry(identity.to_owned())
            .or_default()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete_property(&self, identity: &str, key: &str) -> Result<(), PropertyStoreError> {
        let mut props = self.inner.write().await;
        if let Some(scoped) = props.get_mut(identity) {
            scoped.remove(key);
            if scoped.is_empty() {
                props.remove(identity);
            }
        }
        Ok(())
    }
}

// =============================================================================
// POSTGRES
// =============================================================================

/// Store backed by the `user_properties` table.
#[derive(Clone)]
pub struct PgPropertyStore {
    pool: PgPool,
}

impl PgPropertyStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PropertyStore for PgPropertyStore {
    async fn get_property(&self, identity: &str, key: &str) -> Result<Option<String>, PropertyStoreError> {
        let row = sqlx::query("SELECT value FROM user_properties WHERE identity = $1 AND key = $2")
            .bind(identity)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set_property(&self, identity: &str, key: &str, value: &str) -> Result<(), PropertyStoreError> {
        sqlx::query(
            r"INSERT INTO user_properties (identity, key, value)
              VALUES ($1, $2, $3)
              ON CONFLICT (identity, key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(identity)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_property(&self, identity: &str, key: &str) -> Result<(), PropertyStoreError> {
        sqlx::query("DELETE FROM user_properties WHERE identity = $1 AND key = $2")
            .bind(identity)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "properties_test.rs"]
mod tests;
