//! Cache Module
//!
//! The volatile key-value store consulted before the backing store.
//! `CacheStore` is the narrow interface the accessor consumes; `MemoryCache`
//! is the in-process implementation with TTL expiry and bounded capacity.

mod clock;
mod entry;
mod memory;


use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheResult;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use memory::MemoryCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Cache Store Trait ==
/// Get, set-with-expiry and delete over serialized values.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value. The entry
    /// expires on its own once `ttl` has elapsed.
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Removes `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;
}
