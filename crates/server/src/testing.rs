//! Test doubles shared by the server test modules.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bookcover_client::CoverSource;
use bookcover_core::{AddOutcome, CacheDb, CacheStore, Error};

/// What a [`FakeSource`] answers with.
#[derive(Debug, Clone)]
pub enum Answer {
    Found(String),
    NotFound,
    Unreachable,
}

/// Cover source that counts calls and returns a canned answer.
#[derive(Debug)]
pub struct FakeSource {
    answer: Answer,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(answer: Answer) -> Arc<Self> {
        Arc::new(Self { answer, calls: AtomicUsize::new(0) })
    }

    pub fn found(url: &str) -> Arc<Self> {
        Self::new(Answer::Found(url.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, what: &str) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            Answer::Found(url) => Ok(url.clone()),
            Answer::NotFound => Err(Error::NotFound(format!("image was not found for {what}"))),
            Answer::Unreachable => Err(Error::FetchFailed("failed to fetch URL: connection refused".into())),
        }
    }
}

#[async_trait]
impl CoverSource for FakeSource {
    async fn fetch_by_title_author(&self, title: &str, author: &str) -> Result<String, Error> {
        self.answer(&format!("[book_title={title}, author_name={author}]"))
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> Result<String, Error> {
        self.answer(&format!("ISBN {isbn}"))
    }
}

/// Store whose every call fails.
#[derive(Debug, Default)]
pub struct BrokenStore;

#[async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Err(Error::MigrationFailed("store offline".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), Error> {
        Err(Error::MigrationFailed("store offline".into()))
    }

    async fn add(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<AddOutcome, Error> {
        Err(Error::MigrationFailed("store offline".into()))
    }

    async fn increment(&self, _key: &str, _delta: u64) -> Result<Option<u64>, Error> {
        Err(Error::MigrationFailed("store offline".into()))
    }
}

/// Store that never answers within any reasonable deadline.
#[derive(Debug, Default)]
pub struct StalledStore;

#[async_trait]
impl CacheStore for StalledStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }

    async fn add(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<AddOutcome, Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(AddOutcome::Stored)
    }

    async fn increment(&self, _key: &str, _delta: u64) -> Result<Option<u64>, Error> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(None)
    }
}

/// Store that reports every counter as missing, and every add as lost.
///
/// Drives the limiter down its single-retry path.
#[derive(Debug, Default)]
pub struct RacingStore {
    pub increments: AtomicUsize,
}

#[async_trait]
impl CacheStore for RacingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), Error> {
        Ok(())
    }

    async fn add(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<AddOutcome, Error> {
        Ok(AddOutcome::AlreadyExists)
    }

    async fn increment(&self, _key: &str, _delta: u64) -> Result<Option<u64>, Error> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    }
}

/// Store where another request always creates the counter first.
///
/// Every key's first increment misses and its add loses; the retried
/// increment then sees the counter at `count`.
#[derive(Debug)]
pub struct LateCounterStore {
    count: u64,
    seen: Mutex<HashSet<String>>,
    pub increments: AtomicUsize,
}

impl LateCounterStore {
    pub fn new(count: u64) -> Self {
        Self { count, seen: Mutex::new(HashSet::new()), increments: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl CacheStore for LateCounterStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> Result<(), Error> {
        Ok(())
    }

    async fn add(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<AddOutcome, Error> {
        Ok(AddOutcome::AlreadyExists)
    }

    async fn increment(&self, key: &str, _delta: u64) -> Result<Option<u64>, Error> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        let first_attempt = self.seen.lock().unwrap().insert(key.to_string());
        Ok(if first_attempt { None } else { Some(self.count) })
    }
}

pub async fn memory_store() -> Arc<CacheDb> {
    Arc::new(CacheDb::open_in_memory().await.unwrap())
}

/// Poll `key` until the detached cache write lands.
pub async fn wait_for_entry(store: &dyn CacheStore, key: &str) -> Option<String> {
    for _ in 0..50 {
        if let Some(value) = store.get(key).await.unwrap() {
            return Some(value);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}
