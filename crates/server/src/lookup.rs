//! Cache-aside cover lookup.
//!
//! The cache holds the URL exactly as scraped; the size variant is applied on
//! the way out, so one entry serves every size. Cache trouble never fails a
//! lookup: read errors count as misses and writes run detached.

use std::sync::Arc;
use std::time::Duration;

use bookcover_client::CoverSource;
use bookcover_core::cache::bounded;
use bookcover_core::{CacheStore, Error, ImageSize, LookupKey};

/// Resolves books to cover URLs through an optional cache.
#[derive(Clone)]
pub struct LookupService {
    cache: Option<Arc<dyn CacheStore>>,
    source: Arc<dyn CoverSource>,
    cache_timeout: Duration,
    cover_ttl: Option<Duration>,
}

impl LookupService {
    pub fn new(
        cache: Option<Arc<dyn CacheStore>>, source: Arc<dyn CoverSource>, cache_timeout: Duration,
        cover_ttl: Option<Duration>,
    ) -> Self {
        Self { cache, source, cache_timeout, cover_ttl }
    }

    pub async fn resolve_by_title_author(&self, title: &str, author: &str, size: ImageSize) -> Result<String, Error> {
        let key = LookupKey::title_author(title, author)?;
        self.resolve(key, size).await
    }

    pub async fn resolve_by_isbn(&self, isbn: &str, size: ImageSize) -> Result<String, Error> {
        let key = LookupKey::isbn(isbn)?;
        self.resolve(key, size).await
    }

    async fn resolve(&self, key: LookupKey, size: ImageSize) -> Result<String, Error> {
        let cache_key = key.cache_key();

        if let Some(url) = self.cached(&cache_key).await {
            tracing::debug!(key = %cache_key, "cover cache hit");
            return Ok(size.apply(&url));
        }
        tracing::debug!(key = %cache_key, "cover cache miss");

        let url = match &key {
            LookupKey::TitleAuthor { title, author } => self.source.fetch_by_title_author(title, author).await?,
            LookupKey::Isbn { digits } => self.source.fetch_by_isbn(digits).await?,
        };

        self.remember(cache_key, url.clone());
        Ok(size.apply(&url))
    }

    async fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        match bounded(self.cache_timeout, "get", cache.get(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cover cache read failed, treating as miss");
                None
            }
        }
    }

    /// Store the raw URL in the background. The response does not wait on it.
    fn remember(&self, key: String, url: String) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let timeout = self.cache_timeout;
        let ttl = self.cover_ttl;

        tokio::spawn(async move {
            if let Err(e) = bounded(timeout, "set", cache.set(&key, &url, ttl)).await {
                tracing::warn!(key = %key, error = %e, "failed to cache cover URL");
            }
        });
    }
}
