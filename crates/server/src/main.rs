//! bookcover-api server entry point.
//!
//! Loads configuration, opens the cache store, and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bookcover_client::{FetchClient, FetchConfig, Goodreads};
use bookcover_core::{AppConfig, CacheDb, CacheStore};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod lookup;
mod middleware;
mod ratelimit;
mod response;
mod routes;
#[cfg(test)]
mod testing;

use lookup::LookupService;
use ratelimit::RateLimiter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = AppConfig::load()?;

    let db = if config.cache_enabled {
        let db = Arc::new(CacheDb::open(&config.db_path).await?);
        spawn_purge(db.clone(), config.purge_interval());
        tracing::info!(path = %config.db_path.display(), "cache store opened");
        Some(db)
    } else {
        tracing::info!("cache disabled, lookups go straight to the catalog");
        None
    };
    let cache = db.map(|db| db as Arc<dyn CacheStore>);

    let fetch = FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::default()
    })?;
    let source = Goodreads::new(fetch, &config.catalog_base_url)?;

    let lookup = LookupService::new(cache.clone(), Arc::new(source), config.cache_timeout(), config.cover_ttl());
    let limiter = Arc::new(RateLimiter::new(cache, config.rate_limit, config.cache_timeout()));
    let limits = limiter.config();
    tracing::info!(
        daily_limit = limits.daily_limit,
        monthly_limit = limits.monthly_limit,
        unlimited = limits.unlimited,
        "rate limit configured"
    );

    let app = handler::router(lookup, limiter);
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Starting bookcover-api");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically delete expired cache entries.
fn spawn_purge(db: Arc<CacheDb>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match db.purge_expired().await {
                Ok(0) => {}
                Ok(deleted) => tracing::debug!(deleted, "purged expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "cache purge failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
