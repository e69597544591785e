//! Catalog sources that resolve a book to a cover URL.
//!
//! [`CoverSource`] is the seam the lookup service depends on; [`Goodreads`]
//! is the production implementation, which performs one fetch per call and
//! hands the page to the extractor.

pub mod url;

pub use self::url::UrlError;

use async_trait::async_trait;
use bookcover_core::Error;
use reqwest::Url;

use crate::extract::{extract_by_isbn, extract_by_title_author};
use crate::fetch::FetchClient;

/// Source of cover image URLs.
#[async_trait]
pub trait CoverSource: Send + Sync {
    /// Resolve a separator-joined title and author to a full-size cover URL.
    async fn fetch_by_title_author(&self, title: &str, author: &str) -> Result<String, Error>;

    /// Resolve a hyphen-free ISBN-13 to a cover URL.
    async fn fetch_by_isbn(&self, isbn: &str) -> Result<String, Error>;
}

/// Goodreads search pages as a cover source.
#[derive(Debug, Clone)]
pub struct Goodreads {
    fetch: FetchClient,
    base_url: Url,
}

impl Goodreads {
    /// Create a source that queries the catalog at `base_url`.
    pub fn new(fetch: FetchClient, base_url: &str) -> Result<Self, Error> {
        let base_url = self::url::parse_base(base_url).map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Self { fetch, base_url })
    }

    async fn fetch_page(&self, url: &Url) -> Result<String, Error> {
        let response = self.fetch.fetch(url).await?;
        Ok(response.text()?.to_string())
    }
}

#[async_trait]
impl CoverSource for Goodreads {
    async fn fetch_by_title_author(&self, title: &str, author: &str) -> Result<String, Error> {
        let url = self::url::title_search(&self.base_url, title).map_err(|e| Error::FetchFailed(e.to_string()))?;
        tracing::debug!(%url, "searching catalog by title");

        let html = self.fetch_page(&url).await?;
        extract_by_title_author(&html, title, author)
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> Result<String, Error> {
        let url = self::url::isbn_search(&self.base_url, isbn).map_err(|e| Error::FetchFailed(e.to_string()))?;
        tracing::debug!(%url, "searching catalog by ISBN");

        let html = self.fetch_page(&url).await?;
        extract_by_isbn(&html, isbn)
    }
}
