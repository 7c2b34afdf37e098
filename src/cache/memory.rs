//! In-memory cache store.
//!
//! HashMap storage with lazy TTL expiry on read, a periodic sweep via
//! `purge_expired`, and a capacity bound that evicts the entry closest to
//! expiry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStore, Clock, SystemClock, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, CacheResult};

// == Memory Cache ==
#[derive(Debug)]
pub struct MemoryCache {
    /// Key-value storage
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Time source for stamping and expiring entries
    clock: Arc<dyn Clock>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// When set, every call fails with `CacheError::Unavailable`
    offline: AtomicBool,
    get_calls: AtomicU64,
    set_calls: AtomicU64,
    delete_calls: AtomicU64,
}

impl MemoryCache {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` entries, on the system clock.
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            max_entries: max_entries.max(1),
            offline: AtomicBool::new(false),
            get_calls: AtomicU64::new(0),
            set_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// True if `key` holds a live (unexpired) entry.
    pub async fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remaining lifetime of a live entry.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now_ms();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    /// Simulates an outage: while offline every trait call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::Relaxed)
    }

    pub fn set_calls(&self) -> u64 {
        self.set_calls.load(Ordering::Relaxed)
    }

    pub fn delete_calls(&self) -> u64 {
        self.delete_calls.load(Ordering::Relaxed)
    }

    fn ensure_online(&self) -> CacheResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("memory cache is offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Frees one slot: expired entries go first, otherwise the entry that
    /// would expire soonest.
    fn make_room(entries: &mut HashMap<String, CacheEntry>, now: u64) {
        entries.retain(|_, entry| !entry.is_expired(now));
        if entries.is_empty() {
            return;
        }

        let victim = entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());

        if let Some(key) = victim {
            entries.remove(&key);
            debug!("Evicted cache entry {}", key);
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    // == Get ==
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;

        let now = self.clock.now_ms();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was replaced in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    // == Set ==
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.set_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;

        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key must be 1 to {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if ttl.is_zero() {
            return Err(CacheError::InvalidRequest("TTL must be positive".to_string()));
        }

        let now = self.clock.now_ms();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            Self::make_room(&mut entries, now);
        }

        entries.insert(key.to_string(), CacheEntry::new(value, now, ttl));
        Ok(())
    }

    // == Delete ==
    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.delete_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;

        self.entries.write().await.remove(key);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    const HOUR: Duration = Duration::from_secs(3600);

    fn manual_cache(max_entries: usize) -> (MemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        (MemoryCache::with_clock(max_entries, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(100);

        cache.set_with_ttl("key1", b"value1".to_vec(), HOUR).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap(), Some(b"value1".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(100);
        assert_eq!(cache.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MemoryCache::new(100);

        cache.set_with_ttl("key1", b"v".to_vec(), HOUR).await.unwrap();
        cache.delete("key1").await.unwrap();
        cache.delete("key1").await.unwrap();
        cache.delete("never-set").await.unwrap();

        assert!(cache.is_empty().await);
        assert_eq!(cache.delete_calls(), 3);
    }

    #[tokio::test]
    async fn test_overwrite_resets_ttl() {
        let (cache, clock) = manual_cache(100);

        cache.set_with_ttl("key1", b"a".to_vec(), Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_secs(8));
        cache.set_with_ttl("key1", b"b".to_vec(), Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("key1").await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let (cache, clock) = manual_cache(100);

        cache.set_with_ttl("key1", b"v".to_vec(), Duration::from_secs(1)).await.unwrap();
        assert!(cache.contains("key1").await);

        clock.advance(Duration::from_millis(1000));

        assert_eq!(cache.get("key1").await.unwrap(), None);
        assert_eq!(cache.len().await, 0, "Expired entry should be dropped on read");
    }

    #[tokio::test]
    async fn test_sub_millisecond_ttl_is_readable_until_next_tick() {
        let (cache, clock) = manual_cache(100);

        cache.set_with_ttl("key1", b"v".to_vec(), Duration::from_micros(500)).await.unwrap();
        assert_eq!(cache.get("key1").await.unwrap(), Some(b"v".to_vec()));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = manual_cache(100);

        cache.set_with_ttl("short", b"v".to_vec(), Duration::from_secs(1)).await.unwrap();
        cache.set_with_ttl("long", b"v".to_vec(), Duration::from_secs(10)).await.unwrap();
        clock.advance(Duration::from_secs(2));

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.contains("long").await);
        assert_eq!(cache.ttl_remaining("long").await, Some(Duration::from_secs(8)));
    }

    #[tokio::test]
    async fn test_capacity_evicts_soonest_to_expire() {
        let (cache, _clock) = manual_cache(2);

        cache.set_with_ttl("a", b"1".to_vec(), Duration::from_secs(100)).await.unwrap();
        cache.set_with_ttl("b", b"2".to_vec(), Duration::from_secs(5)).await.unwrap();
        cache.set_with_ttl("c", b"3".to_vec(), Duration::from_secs(50)).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.contains("a").await);
        assert!(!cache.contains("b").await);
        assert!(cache.contains("c").await);
    }

    #[tokio::test]
    async fn test_capacity_prefers_expired_entries() {
        let (cache, clock) = manual_cache(2);

        cache.set_with_ttl("a", b"1".to_vec(), Duration::from_secs(1)).await.unwrap();
        cache.set_with_ttl("b", b"2".to_vec(), Duration::from_secs(2)).await.unwrap();
        clock.advance(Duration::from_secs(3));
        cache.set_with_ttl("c", b"3".to_vec(), Duration::from_secs(10)).await.unwrap();

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_rejects_invalid_requests() {
        let cache = MemoryCache::new(100);
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);
        let large_value = vec![0u8; MAX_VALUE_SIZE + 1];

        assert!(matches!(
            cache.set_with_ttl(&long_key, Vec::new(), HOUR).await,
            Err(CacheError::InvalidRequest(_))
        ));
        assert!(matches!(
            cache.set_with_ttl("key", large_value, HOUR).await,
            Err(CacheError::InvalidRequest(_))
        ));
        assert!(matches!(
            cache.set_with_ttl("key", Vec::new(), Duration::ZERO).await,
            Err(CacheError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_cache_fails_calls() {
        let cache = MemoryCache::new(100);
        cache.set_offline(true);

        assert!(matches!(cache.get("k").await, Err(CacheError::Unavailable(_))));
        assert!(matches!(cache.delete("k").await, Err(CacheError::Unavailable(_))));
        assert_eq!(cache.get_calls(), 1);
    }
}
