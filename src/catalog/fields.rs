//! Field Updates
//!
//! Partial updates are a mapping from a closed set of field names to scalar
//! values. Unknown names and mistyped values are rejected up front, so the
//! backing store only ever sees validated updates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, Result};

// == Product Field ==
/// Updatable product fields. `product_id` is the identity and never updatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProductField {
    Name,
    Price,
    Stock,
}

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Price => "price",
            ProductField::Stock => "stock",
        }
    }

    // == Check ==
    /// Type-checks a value for this field, normalizing integer prices.
    fn check(&self, value: FieldValue) -> Result<FieldValue> {
        match (self, value) {
            (ProductField::Name, FieldValue::Text(name)) => {
                if name.trim().is_empty() {
                    Err(AccessError::InvalidUpdate("name cannot be empty".to_string()))
                } else {
                    Ok(FieldValue::Text(name))
                }
            }
            (ProductField::Price, FieldValue::Int(price)) if price >= 0 => {
                Ok(FieldValue::Float(price as f64))
            }
            (ProductField::Price, FieldValue::Float(price)) if price.is_finite() && price >= 0.0 => {
                Ok(FieldValue::Float(price))
            }
            (ProductField::Price, _) => Err(AccessError::InvalidUpdate(
                "price must be a non-negative number".to_string(),
            )),
            (ProductField::Stock, FieldValue::Int(stock)) if stock >= 0 => Ok(FieldValue::Int(stock)),
            (ProductField::Stock, _) => Err(AccessError::InvalidUpdate(
                "stock must be a non-negative integer".to_string(),
            )),
            (ProductField::Name, _) => {
                Err(AccessError::InvalidUpdate("name must be a string".to_string()))
            }
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(ProductField::Name),
            "price" => Ok(ProductField::Price),
            "stock" => Ok(ProductField::Stock),
            "product_id" => Err(AccessError::InvalidUpdate(
                "product_id cannot be updated".to_string(),
            )),
            other => Err(AccessError::InvalidUpdate(format!("unknown field '{}'", other))),
        }
    }
}

// == Field Value ==
/// Scalar value carried by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl TryFrom<&serde_json::Value> for FieldValue {
    type Error = AccessError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(FieldValue::Text(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(FieldValue::Float(f))
                } else {
                    Err(AccessError::InvalidUpdate(format!("unsupported number {}", n)))
                }
            }
            other => Err(AccessError::InvalidUpdate(format!(
                "expected a scalar value, got {}",
                other
            ))),
        }
    }
}

// == Field Updates ==
/// A validated, non-empty set of field updates for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdates {
    fields: BTreeMap<ProductField, FieldValue>,
}

impl FieldUpdates {
    // == Parse ==
    /// Validates named updates.
    ///
    /// Fails on an empty set, an unknown or immutable field name, or a value
    /// of the wrong type. A field named twice keeps the last value.
    pub fn parse<K, V, I>(updates: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut fields = BTreeMap::new();
        for (name, value) in updates {
            let field: ProductField = name.as_ref().parse()?;
            let value = field.check(value.into())?;
            fields.insert(field, value);
        }

        if fields.is_empty() {
            return Err(AccessError::InvalidUpdate("no fields to update".to_string()));
        }

        Ok(Self { fields })
    }

    /// Validates a JSON object body such as `{"price": 1250, "stock": 55}`.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let pairs = object
            .iter()
            .map(|(name, value)| FieldValue::try_from(value).map(|v| (name.as_str(), v)))
            .collect::<Result<Vec<_>>>()?;
        Self::parse(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductField, &FieldValue)> {
        self.fields.iter()
    }

    pub fn get(&self, field: ProductField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Number of fields updated; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}
