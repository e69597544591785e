//! Key-value store contract and its SQLite implementation.
//!
//! Values are strings; counters are decimal strings, as in memcached.
//! Expiry is stored as a unix timestamp in milliseconds and every read
//! ignores rows past their deadline, so an expired key behaves as absent
//! even before [`CacheDb::purge_expired`] removes it.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

use super::connection::CacheDb;
use crate::Error;

/// Result of an add-if-absent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Stored,
    AlreadyExists,
}

/// Minimal shared key-value contract backing the cover cache and rate-limit counters.
///
/// Implementations must be safe for concurrent use; `add` and `increment`
/// must each be atomic.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store a value unconditionally. `None` means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), Error>;

    /// Store a value only if no live entry exists for the key.
    async fn add(&self, key: &str, value: &str, ttl: Duration) -> Result<AddOutcome, Error>;

    /// Add `delta` to a counter and return the new value, or `None` if the key is absent.
    ///
    /// The entry keeps its original expiry.
    async fn increment(&self, key: &str, delta: u64) -> Result<Option<u64>, Error>;
}

/// Run a cache call with a deadline.
pub async fn bounded<T, F>(timeout: Duration, op: &str, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::CacheTimeout(format!("{op} exceeded {}ms", timeout.as_millis()))),
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn deadline(ttl: Duration) -> i64 {
    now_ms().saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let value = conn
                    .query_row(
                        "SELECT value FROM kv_store
                        WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                        params![key, now],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(Error::from)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let expires_at = ttl.map(deadline);
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_store (key, value, expires_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        expires_at = excluded.expires_at",
                    params![key, value, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn add(&self, key: &str, value: &str, ttl: Duration) -> Result<AddOutcome, Error> {
        let key = key.to_string();
        let value = value.to_string();
        let now = now_ms();
        let expires_at = deadline(ttl);
        self.conn
            .call(move |conn| -> Result<AddOutcome, Error> {
                conn.execute(
                    "DELETE FROM kv_store WHERE key = ?1 AND expires_at IS NOT NULL AND expires_at <= ?2",
                    params![key, now],
                )?;
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO kv_store (key, value, expires_at) VALUES (?1, ?2, ?3)",
                    params![key, value, expires_at],
                )?;
                Ok(if inserted == 1 { AddOutcome::Stored } else { AddOutcome::AlreadyExists })
            })
            .await
            .map_err(Error::from)
    }

    async fn increment(&self, key: &str, delta: u64) -> Result<Option<u64>, Error> {
        let key = key.to_string();
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<Option<u64>, Error> {
                let current: Option<String> = conn
                    .query_row(
                        "SELECT value FROM kv_store
                        WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                        params![key, now],
                        |row| row.get(0),
                    )
                    .optional()?;

                let Some(current) = current else {
                    return Ok(None);
                };

                let count: u64 = current
                    .trim()
                    .parse()
                    .map_err(|_| Error::InvalidCounter(key.clone()))?;
                let next = count.saturating_add(delta);

                conn.execute("UPDATE kv_store SET value = ?2 WHERE key = ?1", params![key, next.to_string()])?;
                Ok(Some(next))
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let now = now_ms();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM kv_store WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    params![now],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
