//! Request DTOs for the product API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::catalog::FieldUpdates;
use crate::error::Result;

/// Request body for a partial product update (PATCH /products/:id)
///
/// A flat JSON object of field names to new values, for example
/// `{"price": 1250, "stock": 55}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct UpdateRequest {
    pub fields: Map<String, Value>,
}

impl UpdateRequest {
    /// Validates the body into field updates.
    ///
    /// Fails on an empty object, unknown fields, or mistyped values.
    pub fn into_updates(self) -> Result<FieldUpdates> {
        FieldUpdates::from_json_object(&self.fields)
    }
}
