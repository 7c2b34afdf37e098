//! Backing Store Module
//!
//! The durable source of truth, consumed through the `BackingStore` trait.
//! `MemoryStore` is the in-process implementation used by the server binary
//! and the tests.

mod memory;

use async_trait::async_trait;

use crate::catalog::{FieldUpdates, Product, ProductId};
use crate::error::StoreResult;

pub use memory::MemoryStore;

// == Backing Store Trait ==
/// Point lookup and point update keyed by product identifier.
///
/// Implementations own their connection lifecycle and timeouts; the accessor
/// only borrows a handle per call.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Returns the product, or `None` when no row matches.
    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Applies all updates atomically to the row matching `id`.
    ///
    /// Returns the number of affected rows: 0 when the id is unknown.
    async fn update_by_id(&self, id: ProductId, updates: &FieldUpdates) -> StoreResult<u64>;
}
