//! Product Entity
//!
//! The record owned by the backing store. The cache only ever holds its
//! JSON snapshot.

use serde::{Deserialize, Serialize};

use crate::catalog::{FieldUpdates, FieldValue, ProductField, ProductId};

// == Product ==
/// A product row as returned by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

impl Product {
    // == Constructor ==
    pub fn new(product_id: ProductId, name: impl Into<String>, price: f64, stock: i64) -> Self {
        Self {
            product_id,
            name: name.into(),
            price,
            stock,
        }
    }

    // == Apply ==
    /// Applies validated field updates in place.
    ///
    /// Values are type-checked when `FieldUpdates` is built; mismatched
    /// pairs are skipped.
    pub fn apply(&mut self, updates: &FieldUpdates) {
        for (field, value) in updates.iter() {
            match (field, value) {
                (ProductField::Name, FieldValue::Text(name)) => self.name = name.clone(),
                (ProductField::Price, FieldValue::Float(price)) => self.price = *price,
                (ProductField::Stock, FieldValue::Int(stock)) => self.stock = *stock,
                _ => {}
            }
        }
    }

    // == Serialization ==
    /// Encodes the snapshot stored in the cache.
    pub fn to_cache_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decodes a cached snapshot.
    pub fn from_cache_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

// == Sample Data ==
/// The demo catalog seeded into the backing store at startup.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        Product::new(101, "Laptop", 1000.0, 50),
        Product::new(102, "Smartphone", 500.0, 200),
        Product::new(103, "Tablet", 300.0, 100),
        Product::new(104, "Monitor", 200.0, 75),
        Product::new(105, "Keyboard", 50.0, 150),
    ]
}
