//! Cache Key Derivation
//!
//! Keys have the form `<prefix>_<id>`. The separator is fixed so the read
//! and write paths always agree on the key for a given product.

use std::fmt;

use crate::catalog::ProductId;

/// Prefix used for product entries unless configured otherwise.
pub const DEFAULT_KEY_PREFIX: &str = "product";

/// Separator between the entity prefix and the identifier.
pub const KEY_SEPARATOR: char = '_';

// == Cache Key ==
/// Deterministic cache key for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prefix: &str, id: ProductId) -> Self {
        Self(format!("{}{}{}", prefix, KEY_SEPARATOR, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
