//! SQLite-backed key-value store for cover URLs and rate-limit counters.
//!
//! This module provides a small memcached-style store using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - `get` / `set` with optional per-entry expiry
//! - Atomic add-if-absent and increment
//! - Automatic schema migrations
//! - Purging of expired entries

pub mod connection;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{AddOutcome, CacheStore, bounded};
