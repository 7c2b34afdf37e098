//! Product Cache - cache-aside product lookups
//!
//! Reads are served from a TTL cache and populated from the backing store on
//! a miss; writes go to the backing store and invalidate the cached entry.

pub mod accessor;
pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod connect;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use accessor::{AccessorOptions, CacheAside, WriteOutcome};
pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
