//! Cache-Aside Accessor
//!
//! Every product read and write funnels through [`CacheAside`]:
//!
//! - **Read**: serve from the cache when possible. On a miss, read the
//!   backing store and populate the cache with a TTL. Absence is never cached.
//! - **Write**: update the backing store, then delete the cache key so the
//!   next read repopulates it from the fresh row.
//!
//! Cache failures never fail a call: reads fall through to the backing
//! store and a failed invalidation leaves a stale entry bounded by its TTL.
//! Backing store failures are always surfaced.
//!
//! For one key, the miss path (lookup + populate) and the write path
//! (update + invalidate) run under a per-key lock. A read that misses while
//! a write is in flight therefore cannot re-insert the pre-write value after
//! the write has invalidated the key. The lock is process-local.
//!
//! Writes run on a spawned task, so a caller that stops waiting cannot
//! leave an updated row behind a stale cache entry.

mod locks;
mod stats;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::catalog::{CacheKey, FieldUpdates, FieldValue, Product, ProductId, DEFAULT_KEY_PREFIX};
use crate::config::Config;
use crate::error::{AccessError, Operation, Result};
use crate::store::BackingStore;

use locks::KeyLocks;

pub use stats::{AccessStats, StatsSnapshot};

/// Default lifetime of a populated cache entry (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

// == Accessor Options ==
#[derive(Debug, Clone)]
pub struct AccessorOptions {
    /// Prefix of every cache key, as in `product_101`
    pub key_prefix: String,
    /// TTL applied when populating the cache
    pub ttl: Duration,
    /// Extra delete attempts after a failed invalidation
    pub invalidation_retries: u32,
    /// Pause between invalidation attempts
    pub invalidation_backoff: Duration,
}

impl Default for AccessorOptions {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            invalidation_retries: 2,
            invalidation_backoff: Duration::from_millis(50),
        }
    }
}

impl AccessorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key_prefix: config.key_prefix.clone(),
            ttl: Duration::from_secs(config.cache_ttl),
            invalidation_retries: config.invalidation_retries,
            invalidation_backoff: Duration::from_millis(config.invalidation_backoff_ms),
        }
    }
}

// == Write Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The row was updated.
    ///
    /// `invalidated` is false when every delete attempt failed; the stale
    /// entry then lives until its TTL runs out.
    Updated { affected: u64, invalidated: bool },
    /// No row matches the id; the cache was not touched.
    NotFound,
}

/// Result of consulting the cache for one key.
enum Lookup {
    Hit(Product),
    Miss,
    /// The cache store failed; the caller already logged and counted it.
    Unavailable,
}

// == Cache-Aside Accessor ==
pub struct CacheAside {
    shared: Arc<Shared>,
}

/// State shared between the accessor and the write tasks it spawns.
struct Shared {
    store: Arc<dyn BackingStore>,
    cache: Arc<dyn CacheStore>,
    options: AccessorOptions,
    locks: KeyLocks,
    stats: AccessStats,
}

impl CacheAside {
    // == Constructor ==
    /// Builds an accessor over borrowed collaborator handles. The caller
    /// keeps ownership of their lifecycle.
    pub fn new(
        store: Arc<dyn BackingStore>,
        cache: Arc<dyn CacheStore>,
        options: AccessorOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                cache,
                options,
                locks: KeyLocks::new(),
                stats: AccessStats::new(),
            }),
        }
    }

    pub fn options(&self) -> &AccessorOptions {
        &self.shared.options
    }

    /// Cache key used for `id` on both the read and write paths.
    pub fn cache_key(&self, id: ProductId) -> CacheKey {
        self.shared.cache_key(id)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    // == Read ==
    /// Returns the product, or `None` if the backing store has no such id.
    ///
    /// A hit never touches the backing store. A miss issues at most one
    /// backing store read and at most one cache write.
    pub async fn read(&self, id: ProductId) -> Result<Option<Product>> {
        self.shared.read(id).await
    }

    // == Write ==
    /// Applies `updates` to the product and invalidates its cache entry.
    ///
    /// Success is reported only after the backing store acknowledged the
    /// update. An empty update cannot reach this point: `FieldUpdates`
    /// rejects it at construction.
    ///
    /// The update and its invalidation run on their own task. Dropping the
    /// returned future stops the caller from waiting but never separates a
    /// committed update from its invalidation.
    pub async fn write(&self, id: ProductId, updates: &FieldUpdates) -> Result<WriteOutcome> {
        let shared = Arc::clone(&self.shared);
        let updates = updates.clone();

        tokio::spawn(async move { shared.write(id, &updates).await })
            .await
            .map_err(|e| {
                error!("Write task for product {} did not finish: {}", id, e);
                AccessError::Interrupted {
                    id,
                    operation: Operation::Write,
                    reason: e.to_string(),
                }
            })?
    }

    /// Validates named field updates, then runs [`CacheAside::write`].
    pub async fn write_fields<K, V, I>(&self, id: ProductId, updates: I) -> Result<WriteOutcome>
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let updates = FieldUpdates::parse(updates)?;
        self.write(id, &updates).await
    }
}

impl Shared {
    fn cache_key(&self, id: ProductId) -> CacheKey {
        CacheKey::new(&self.options.key_prefix, id)
    }

    async fn read(&self, id: ProductId) -> Result<Option<Product>> {
        let key = self.cache_key(id);

        let cache_reachable = match self.lookup_cached(id, &key).await {
            Lookup::Hit(product) => {
                self.stats.record_hit();
                debug!("Cache hit for {}", key);
                return Ok(Some(product));
            }
            Lookup::Miss => true,
            Lookup::Unavailable => false,
        };

        let _guard = self.locks.lock(key.as_str()).await;

        // Another reader may have populated the key while we waited
        if cache_reachable {
            if let Lookup::Hit(product) = self.lookup_cached(id, &key).await {
                self.stats.record_hit();
                debug!("Cache hit for {} after waiting on key lock", key);
                return Ok(Some(product));
            }
        }

        self.stats.record_miss();
        debug!("Cache miss for {}, reading backing store", key);

        self.stats.record_store_read();
        let product = self
            .store
            .find_by_id(id)
            .await
            .map_err(|source| AccessError::StoreUnavailable {
                id,
                operation: Operation::Read,
                source,
            })?;

        match product {
            Some(product) => {
                self.populate(&key, &product).await;
                Ok(Some(product))
            }
            None => {
                self.stats.record_not_found();
                debug!("Product {} not found in backing store", id);
                Ok(None)
            }
        }
    }

    async fn write(&self, id: ProductId, updates: &FieldUpdates) -> Result<WriteOutcome> {
        let key = self.cache_key(id);
        let _guard = self.locks.lock(key.as_str()).await;

        let affected = self
            .store
            .update_by_id(id, updates)
            .await
            .map_err(|source| AccessError::StoreUnavailable {
                id,
                operation: Operation::Write,
                source,
            })?;

        if affected == 0 {
            self.stats.record_not_found();
            debug!("Product {} not found for update", id);
            return Ok(WriteOutcome::NotFound);
        }

        info!("Product {} updated ({} fields)", id, updates.len());
        let invalidated = self.invalidate(&key).await;

        Ok(WriteOutcome::Updated {
            affected,
            invalidated,
        })
    }

    // == Internals ==
    async fn lookup_cached(&self, id: ProductId, key: &CacheKey) -> Lookup {
        let bytes = match self.cache.get(key.as_str()).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Lookup::Miss,
            Err(e) => {
                self.stats.record_cache_error();
                warn!("Cache read for {} failed, falling back to store: {}", key, e);
                return Lookup::Unavailable;
            }
        };

        match Product::from_cache_bytes(&bytes) {
            Ok(product) if product.product_id == id => Lookup::Hit(product),
            Ok(product) => {
                self.discard_malformed(key, &format!("holds product {}", product.product_id))
                    .await;
                Lookup::Miss
            }
            Err(e) => {
                self.discard_malformed(key, &e.to_string()).await;
                Lookup::Miss
            }
        }
    }

    async fn discard_malformed(&self, key: &CacheKey, reason: &str) {
        self.stats.record_malformed_entry();
        warn!("Malformed cache entry {} ({}), deleting it", key, reason);

        if let Err(e) = self.cache.delete(key.as_str()).await {
            self.stats.record_cache_error();
            warn!("Could not delete malformed entry {}: {}", key, e);
        }
    }

    async fn populate(&self, key: &CacheKey, product: &Product) {
        let bytes = match product.to_cache_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.record_populate_failure();
                warn!("Could not encode product {} for cache: {}", product.product_id, e);
                return;
            }
        };

        match self.cache.set_with_ttl(key.as_str(), bytes, self.options.ttl).await {
            Ok(()) => {
                self.stats.record_populate();
                debug!("Cached {} for {}s", key, self.options.ttl.as_secs());
            }
            Err(e) => {
                self.stats.record_populate_failure();
                self.stats.record_cache_error();
                warn!("Could not populate cache for {}: {}", key, e);
            }
        }
    }

    /// Deletes `key`, retrying a bounded number of times. Returns whether
    /// the delete eventually succeeded.
    async fn invalidate(&self, key: &CacheKey) -> bool {
        let attempts = self.options.invalidation_retries.saturating_add(1);

        for attempt in 1..=attempts {
            match self.cache.delete(key.as_str()).await {
                Ok(()) => {
                    self.stats.record_invalidation();
                    debug!("Invalidated {} (attempt {})", key, attempt);
                    return true;
                }
                Err(e) => {
                    self.stats.record_cache_error();
                    warn!(
                        "Invalidation of {} failed (attempt {}/{}): {}",
                        key, attempt, attempts, e
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.options.invalidation_backoff).await;
                    }
                }
            }
        }

        self.stats.record_invalidation_failure();
        error!(
            "Giving up invalidating {}; entry stays stale for up to {}s",
            key,
            self.options.ttl.as_secs()
        );
        false
    }
}
