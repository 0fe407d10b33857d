//! Cache Store Module
//!
//! Validator storage combining a HashMap with LRU tracking and TTL expiration.

use std::collections::HashMap;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, LruTracker, MAX_KEY_LENGTH};
use crate::error::CacheError;

// == Cache Store ==
/// Bounded validator store.
///
/// Eviction policy: when a new key would exceed `max_entries`, the least
/// recently used key (by get or set) is dropped, unless a sweep of expired
/// entries frees room first. Expired entries are also removed lazily on read
/// and in bulk by [`CacheStore::cleanup_expired`].
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL in milliseconds for entries set without one
    default_ttl_ms: u64,
    /// Lower bound on the earliest `expires_at` held; no sweep can free
    /// anything before this instant
    next_expiry_ms: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries, at least 1
    /// * `default_ttl_ms` - TTL in milliseconds for entries set without one
    pub fn new(max_entries: usize, default_ttl_ms: u64) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl_ms,
            next_expiry_ms: u64::MAX,
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_ms` milliseconds.
    ///
    /// Overwriting a key resets its TTL. A TTL of zero stores an entry that
    /// reads back as absent.
    pub fn set(&mut self, key: String, value: bool, ttl_ms: Option<u64>) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key is empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            // Drop dead entries before sacrificing a live one
            if self.sweep_due() == 0 {
                if let Some(evicted_key) = self.lru.evict_oldest() {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
            }
        }

        let entry = CacheEntry::new(value, ttl_ms.unwrap_or(self.default_ttl_ms));
        self.next_expiry_ms = self.next_expiry_ms.min(entry.expires_at);
        self.lru.touch(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the value stored under `key`, or None when absent or expired.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<bool> {
        let value = match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.lru.remove(key);
                self.stats.record_expirations(1);
                self.stats.set_total_entries(self.entries.len());
                None
            }
            Some(entry) => Some(entry.value),
            None => None,
        };

        match value {
            Some(_) => {
                self.stats.record_hit();
                self.lru.touch(key);
            }
            None => self.stats.record_miss(),
        }
        value
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let mut next_expiry_ms = u64::MAX;
        let mut expired_keys = Vec::new();

        for (key, entry) in &self.entries {
            if entry.is_expired_at(now) {
                expired_keys.push(key.clone());
            } else {
                next_expiry_ms = next_expiry_ms.min(entry.expires_at);
            }
        }

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.next_expiry_ms = next_expiry_ms;
        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    /// Runs [`CacheStore::cleanup_expired`] only when some entry may have
    /// expired since the last sweep.
    fn sweep_due(&mut self) -> usize {
        if current_timestamp_ms() < self.next_expiry_ms {
            return 0;
        }
        self.cleanup_expired()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    const HOUR_MS: u64 = 3_600_000;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100, HOUR_MS);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("etag1".to_string(), true, None).unwrap();

        assert_eq!(store.get("etag1"), Some(true));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100, HOUR_MS);
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_zero_ttl_reads_absent() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("etag1".to_string(), true, Some(0)).unwrap();

        assert_eq!(store.get("etag1"), None);
        assert!(store.is_empty());
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("etag1".to_string(), true, Some(50)).unwrap();
        assert_eq!(store.get("etag1"), Some(true));

        sleep(Duration::from_millis(80));

        assert_eq!(store.get("etag1"), None);
    }

    #[test]
    fn test_store_default_ttl_applies() {
        let mut store = CacheStore::new(100, 50);

        store.set("etag1".to_string(), true, None).unwrap();
        sleep(Duration::from_millis(80));

        assert_eq!(store.get("etag1"), None);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("etag1".to_string(), true, Some(0)).unwrap();
        store.set("etag1".to_string(), true, Some(HOUR_MS)).unwrap();

        assert_eq!(store.get("etag1"), Some(true));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_full_of_live_entries_skips_sweep() {
        let mut store = CacheStore::new(2, HOUR_MS);

        store.set("e1".to_string(), true, None).unwrap();
        store.set("e2".to_string(), true, None).unwrap();
        assert!(store.next_expiry_ms > current_timestamp_ms());

        store.set("e3".to_string(), true, None).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.stats().expirations, 0);
    }

    #[test]
    fn test_store_sweep_tracks_next_expiry() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("short".to_string(), true, Some(0)).unwrap();
        assert!(store.next_expiry_ms <= current_timestamp_ms());

        store.set("long".to_string(), true, Some(HOUR_MS)).unwrap();
        store.cleanup_expired();

        assert!(store.next_expiry_ms > current_timestamp_ms());
        assert!(store.next_expiry_ms <= current_timestamp_ms() + HOUR_MS);
    }

    #[test]
    fn test_store_full_sweeps_once_an_entry_expires() {
        let mut store = CacheStore::new(2, HOUR_MS);

        store.set("live".to_string(), true, None).unwrap();
        store.set("brief".to_string(), true, Some(30)).unwrap();
        sleep(Duration::from_millis(50));

        store.set("new".to_string(), true, None).unwrap();

        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.stats().expirations, 1);
        assert_eq!(store.get("live"), Some(true));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3, HOUR_MS);

        store.set("e1".to_string(), true, None).unwrap();
        store.set("e2".to_string(), true, None).unwrap();
        store.set("e3".to_string(), true, None).unwrap();
        store.set("e4".to_string(), true, None).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("e1"), None);
        assert_eq!(store.get("e4"), Some(true));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(3, HOUR_MS);

        store.set("e1".to_string(), true, None).unwrap();
        store.set("e2".to_string(), true, None).unwrap();
        store.set("e3".to_string(), true, None).unwrap();

        store.get("e1");
        store.set("e4".to_string(), true, None).unwrap();

        assert_eq!(store.get("e1"), Some(true));
        assert_eq!(store.get("e2"), None);
    }

    #[test]
    fn test_store_full_prefers_dropping_expired() {
        let mut store = CacheStore::new(2, HOUR_MS);

        store.set("live".to_string(), true, None).unwrap();
        store.set("dead".to_string(), true, Some(0)).unwrap();
        store.set("new".to_string(), true, None).unwrap();

        assert_eq!(store.get("live"), Some(true));
        assert_eq!(store.get("new"), Some(true));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("etag1".to_string(), true, None).unwrap();
        store.get("etag1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100, HOUR_MS);

        store.set("short".to_string(), true, Some(0)).unwrap();
        store.set("long".to_string(), true, Some(HOUR_MS)).unwrap();

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long"), Some(true));
    }

    #[test]
    fn test_store_rejects_bad_keys() {
        let mut store = CacheStore::new(100, HOUR_MS);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        assert!(matches!(
            store.set(long_key, true, None),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set(String::new(), true, None),
            Err(CacheError::InvalidKey(_))
        ));
    }
}
