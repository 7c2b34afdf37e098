//! In-memory backing store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::{sample_catalog, FieldUpdates, Product, ProductId};
use crate::error::{StoreError, StoreResult};
use crate::store::BackingStore;

// == Memory Store ==
/// Product table held in a `HashMap` behind an async `RwLock`.
///
/// Updates run under the write lock, so each `update_by_id` is atomic and
/// updates to the same row are serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<ProductId, Product>>,
    find_calls: AtomicU64,
    update_calls: AtomicU64,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let rows = products.into_iter().map(|p| (p.product_id, p)).collect();
        Self {
            rows: RwLock::new(rows),
            ..Self::default()
        }
    }

    /// Creates a store holding the demo catalog (ids 101 to 105).
    pub fn seeded() -> Self {
        Self::with_products(sample_catalog())
    }

    /// Inserts or replaces a product.
    pub async fn insert(&self, product: Product) {
        self.rows.write().await.insert(product.product_id, product);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Number of `find_by_id` calls served so far.
    pub fn find_calls(&self) -> u64 {
        self.find_calls.load(Ordering::Relaxed)
    }

    /// Number of `update_by_id` calls served so far.
    pub fn update_calls(&self) -> u64 {
        self.update_calls.load(Ordering::Relaxed)
    }

    /// Simulates an outage: while offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.find_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;

        let product = self.rows.read().await.get(&id).cloned();
        debug!("Store lookup for product {}: found={}", id, product.is_some());
        Ok(product)
    }

    async fn update_by_id(&self, id: ProductId, updates: &FieldUpdates) -> StoreResult<u64> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);
        self.ensure_online()?;

        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(product) => {
                product.apply(updates);
                debug!("Store updated product {} ({} fields)", id, updates.len());
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
