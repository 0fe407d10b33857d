//! Shared validator store
//!
//! The async contract the ETag negotiator depends on, and the in-process
//! implementation backed by [`CacheStore`].

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::CacheError;

/// Key/value store holding issued validators.
///
/// `get` returns `Ok(None)` for unknown or expired keys. Implementations
/// must make each call individually atomic; concurrent writers to the same
/// key resolve last-write-wins.
#[async_trait]
pub trait ValidatorStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<bool>, CacheError>;

    async fn set(&self, key: &str, value: bool, ttl_ms: u64) -> Result<(), CacheError>;
}

/// In-memory [`ValidatorStore`] guarded by an async RwLock.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<CacheStore>,
}

impl MemoryStore {
    pub fn new(max_entries: usize, default_ttl_ms: u64) -> Self {
        Self::from_store(CacheStore::new(max_entries, default_ttl_ms))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            inner: RwLock::new(store),
        }
    }

    /// Snapshot of the store counters.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    /// Drops expired entries, returning how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.inner.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl ValidatorStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<bool>, CacheError> {
        // Write lock: reads touch LRU order and may drop an expired entry
        Ok(self.inner.write().await.get(key))
    }

    async fn set(&self, key: &str, value: bool, ttl_ms: u64) -> Result<(), CacheError> {
        self.inner
            .write()
            .await
            .set(key.to_string(), value, Some(ttl_ms))
    }
}
