//! Accessor Statistics
//!
//! Lock-free counters for the accessor's read and write paths.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Access Stats ==
#[derive(Debug, Default)]
pub struct AccessStats {
    hits: AtomicU64,
    misses: AtomicU64,
    store_reads: AtomicU64,
    not_found: AtomicU64,
    populates: AtomicU64,
    populate_failures: AtomicU64,
    invalidations: AtomicU64,
    invalidation_failures: AtomicU64,
    cache_errors: AtomicU64,
    malformed_entries: AtomicU64,
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        pub fn $record(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl AccessStats {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_hit, hits);
    counter!(record_miss, misses);
    counter!(record_store_read, store_reads);
    counter!(record_not_found, not_found);
    counter!(record_populate, populates);
    counter!(record_populate_failure, populate_failures);
    counter!(record_invalidation, invalidations);
    counter!(record_invalidation_failure, invalidation_failures);
    counter!(record_cache_error, cache_errors);
    counter!(record_malformed_entry, malformed_entries);

    // == Snapshot ==
    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            hits: load(&self.hits),
            misses: load(&self.misses),
            store_reads: load(&self.store_reads),
            not_found: load(&self.not_found),
            populates: load(&self.populates),
            populate_failures: load(&self.populate_failures),
            invalidations: load(&self.invalidations),
            invalidation_failures: load(&self.invalidation_failures),
            cache_errors: load(&self.cache_errors),
            malformed_entries: load(&self.malformed_entries),
        }
    }
}

// == Stats Snapshot ==
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Reads served from the cache
    pub hits: u64,
    /// Reads that fell through to the backing store
    pub misses: u64,
    /// Backing store lookups issued
    pub store_reads: u64,
    /// Reads or writes for ids absent from the backing store
    pub not_found: u64,
    /// Cache entries written after a miss
    pub populates: u64,
    /// Cache writes that failed after a miss
    pub populate_failures: u64,
    /// Cache entries deleted after a write
    pub invalidations: u64,
    /// Writes whose invalidation gave up after every retry
    pub invalidation_failures: u64,
    /// Failed cache store calls of any kind
    pub cache_errors: u64,
    /// Cached values that failed to decode
    pub malformed_entries: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any read.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
