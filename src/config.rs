//! Configuration Module
//!
//! Loads server and accessor settings from environment variables.

use std::env;
use std::str::FromStr;

use crate::catalog::DEFAULT_KEY_PREFIX;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for entries populated on a cache miss
    pub cache_ttl: u64,
    /// Prefix of product cache keys
    pub key_prefix: String,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Extra invalidation attempts after a failed cache delete
    pub invalidation_retries: u32,
    /// Pause between invalidation attempts in milliseconds
    pub invalidation_backoff_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CACHE_TTL` - Cache entry TTL in seconds (default: 3600)
    /// - `CACHE_KEY_PREFIX` - Cache key prefix (default: product)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `INVALIDATION_RETRIES` - Extra delete attempts (default: 2)
    /// - `INVALIDATION_BACKOFF_MS` - Pause between attempts (default: 50)
    ///
    /// Unparseable or zero values for the TTL, capacity and interval fall
    /// back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cache_ttl: positive_or(env_or("CACHE_TTL", defaults.cache_ttl), defaults.cache_ttl),
            key_prefix: env::var("CACHE_KEY_PREFIX")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.key_prefix),
            max_entries: positive_or(
                env_or("MAX_ENTRIES", defaults.max_entries),
                defaults.max_entries,
            ),
            cleanup_interval: positive_or(
                env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
                defaults.cleanup_interval,
            ),
            invalidation_retries: env_or("INVALIDATION_RETRIES", defaults.invalidation_retries),
            invalidation_backoff_ms: env_or(
                "INVALIDATION_BACKOFF_MS",
                defaults.invalidation_backoff_ms,
            ),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn positive_or<T: PartialEq + Default>(value: T, default: T) -> T {
    if value == T::default() {
        default
    } else {
        value
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cache_ttl: 3600,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            max_entries: 10_000,
            cleanup_interval: 1,
            invalidation_retries: 2,
            invalidation_backoff_ms: 50,
        }
    }
}
