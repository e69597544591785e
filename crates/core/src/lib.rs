//! Core types and shared functionality for the bookcover API.
//!
//! This crate provides:
//! - Key-value cache store with a SQLite backend
//! - Lookup keys, image size variants and rate-limit tiers
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod types;

pub use cache::{AddOutcome, CacheDb, CacheStore};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use types::{ImageSize, LookupKey, RateLimitConfig};
