//! API Handlers
//!
//! HTTP request handlers for the product endpoints. All product access goes
//! through the cache-aside accessor.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::accessor::{AccessorOptions, CacheAside, WriteOutcome};
use crate::cache::MemoryCache;
use crate::catalog::{Product, ProductId};
use crate::config::Config;
use crate::error::{AccessError, Result};
use crate::models::{HealthResponse, StatsResponse, UpdateRequest, UpdateResponse};
use crate::store::MemoryStore;

/// Application state shared across all handlers.
///
/// Holds the accessor plus the concrete collaborator handles it borrows.
/// The handles are created once by the owner and torn down on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub accessor: Arc<CacheAside>,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
}

impl AppState {
    /// Creates a new AppState over existing collaborator handles.
    pub fn new(store: Arc<MemoryStore>, cache: Arc<MemoryCache>, options: AccessorOptions) -> Self {
        let accessor = CacheAside::new(store.clone(), cache.clone(), options);
        Self {
            accessor: Arc::new(accessor),
            store,
            cache,
        }
    }

    /// Creates a new AppState from configuration, over a store seeded with
    /// the demo catalog.
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::seeded());
        let cache = Arc::new(MemoryCache::new(config.max_entries));
        Self::new(store, cache, AccessorOptions::from_config(config))
    }
}

/// Handler for GET /products/:id
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .accessor
        .read(id)
        .await?
        .map(Json)
        .ok_or(AccessError::NotFound(id))
}

/// Handler for PATCH /products/:id
///
/// Updates the named fields and invalidates the product's cache entry.
pub async fn update_product_handler(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    payload: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>> {
    let Json(req) = payload.map_err(|e| {
        AccessError::InvalidUpdate(format!("Failed to parse request body: {}", e.body_text()))
    })?;
    let updates = req.into_updates()?;

    match state.accessor.write(id, &updates).await? {
        WriteOutcome::Updated {
            affected,
            invalidated,
        } => Ok(Json(UpdateResponse::new(id, affected, invalidated))),
        WriteOutcome::NotFound => Err(AccessError::NotFound(id)),
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let entries = state.cache.len().await;
    Json(StatsResponse::new(state.accessor.stats(), entries))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
