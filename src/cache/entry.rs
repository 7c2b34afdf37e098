//! Cache Entry Module
//!
//! A serialized snapshot plus its absolute expiry time.

use std::time::Duration;

// == Cache Entry ==
/// A single cached value with its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Serialized snapshot
    pub value: Vec<u8>,
    /// Creation timestamp (clock milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (clock milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms` that expires after `ttl`.
    ///
    /// Partial milliseconds round up, so any non-zero TTL outlives `now_ms`.
    pub fn new(value: Vec<u8>, now_ms: u64, ttl: Duration) -> Self {
        let ttl_ms = u64::try_from(ttl.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX);
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now_ms` reaches its expiration time, so
    /// it is gone the moment its full TTL has elapsed.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime at `now_ms`, zero once expired.
    pub fn ttl_remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.expires_at.saturating_sub(now_ms))
    }
}
