//! Response DTOs for the product API
//!
//! Defines the structure of outgoing HTTP response bodies. Product reads
//! return the `Product` entity itself.

use serde::Serialize;

use crate::accessor::StatsSnapshot;
use crate::catalog::ProductId;

/// Response body for a successful update (PATCH /products/:id)
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    pub product_id: ProductId,
    /// Rows changed in the backing store
    pub affected: u64,
    /// Whether the cache entry was deleted
    pub invalidated: bool,
}

impl UpdateResponse {
    pub fn new(product_id: ProductId, affected: u64, invalidated: bool) -> Self {
        Self {
            product_id,
            affected,
            invalidated,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub accessor: StatsSnapshot,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Entries currently held by the cache store
    pub cache_entries: usize,
}

impl StatsResponse {
    pub fn new(accessor: StatsSnapshot, cache_entries: usize) -> Self {
        Self {
            hit_rate: accessor.hit_rate(),
            accessor,
            cache_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_response_serialize() {
        let resp = UpdateResponse::new(101, 1, true);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["product_id"], 101);
        assert_eq!(json["affected"], 1);
        assert_eq!(json["invalidated"], true);
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let snapshot = StatsSnapshot {
            hits: 80,
            misses: 20,
            ..StatsSnapshot::default()
        };
        let resp = StatsResponse::new(snapshot, 7);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["hits"], 80);
        assert_eq!(json["cache_entries"], 7);
        assert!(json.get("accessor").is_none());
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
