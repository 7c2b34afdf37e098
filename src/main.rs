//! Product Cache - cache-aside product lookups over HTTP
//!
//! Serves the demo product catalog through the cache-aside accessor.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use product_cache::api::create_router;
use product_cache::cache::MemoryCache;
use product_cache::connect::SharedHandle;
use product_cache::store::MemoryStore;
use product_cache::{spawn_cleanup_task, AccessorOptions, AppState, Config};

/// Main entry point for the product cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the backing store (seeded with the demo catalog) and the cache
/// 4. Start background TTL cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting product cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl={}s, prefix={}, max_entries={}, port={}, cleanup_interval={}s",
        config.cache_ttl,
        config.key_prefix,
        config.max_entries,
        config.server_port,
        config.cleanup_interval
    );

    let store_handle: SharedHandle<MemoryStore> = SharedHandle::new("backing store");
    let cache_handle: SharedHandle<MemoryCache> = SharedHandle::new("cache store");

    let store = store_handle
        .get_or_connect(|| async { Ok::<_, anyhow::Error>(MemoryStore::seeded()) })
        .await
        .context("connecting backing store")?;
    info!("Backing store ready with {} products", store.len().await);

    let max_entries = config.max_entries;
    let cache = cache_handle
        .get_or_connect(|| async move { Ok::<_, anyhow::Error>(MemoryCache::new(max_entries)) })
        .await
        .context("connecting cache store")?;

    let state = AppState::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        AccessorOptions::from_config(&config),
    );

    let cleanup_handle = spawn_cleanup_task(cache, config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup task and allows graceful shutdown.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
