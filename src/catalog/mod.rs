//! Catalog Module
//!
//! The product entity, its closed set of updatable fields, and the cache
//! key derivation shared by the read and write paths.

mod fields;
mod key;
mod product;

pub use fields::{FieldUpdates, FieldValue, ProductField};
pub use key::{CacheKey, DEFAULT_KEY_PREFIX, KEY_SEPARATOR};
pub use product::{sample_catalog, Product};

/// Identifier of a product in the backing store.
pub type ProductId = i64;
