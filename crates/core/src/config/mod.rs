//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (BOOKCOVER_*)
//! 2. TOML config file (if BOOKCOVER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::types::RateLimitConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (BOOKCOVER_*), nested keys split on `__`
/// 2. TOML config file (if BOOKCOVER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server listens on.
    ///
    /// Set via BOOKCOVER_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Whether lookups and rate-limit counters use the cache store.
    ///
    /// Set via BOOKCOVER_CACHE_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Path to SQLite cache database.
    ///
    /// Set via BOOKCOVER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Lifetime of cached cover URLs in seconds; unset keeps them forever.
    ///
    /// Set via BOOKCOVER_COVER_TTL_SECS environment variable.
    #[serde(default)]
    pub cover_ttl_secs: Option<u64>,

    /// Deadline for a single cache store call in milliseconds.
    ///
    /// Set via BOOKCOVER_CACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_cache_timeout_ms")]
    pub cache_timeout_ms: u64,

    /// Interval between expired-entry purges in seconds.
    ///
    /// Set via BOOKCOVER_PURGE_INTERVAL_SECS environment variable.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,

    /// Base URL of the catalog site queried for covers.
    ///
    /// Set via BOOKCOVER_CATALOG_BASE_URL environment variable.
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,

    /// User-Agent string for catalog requests.
    ///
    /// Set via BOOKCOVER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per catalog request.
    ///
    /// Set via BOOKCOVER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Catalog request timeout in milliseconds.
    ///
    /// Set via BOOKCOVER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Quota applied to the bookcover routes.
    ///
    /// Set via BOOKCOVER_RATE_LIMIT__DAILY_LIMIT, BOOKCOVER_RATE_LIMIT__MONTHLY_LIMIT
    /// and BOOKCOVER_RATE_LIMIT__UNLIMITED.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./bookcover-cache.sqlite")
}

fn default_cache_timeout_ms() -> u64 {
    500
}

fn default_purge_interval_secs() -> u64 {
    300
}

fn default_catalog_base_url() -> String {
    "https://www.goodreads.com".into()
}

fn default_user_agent() -> String {
    "bookcover-api/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cache_enabled: true,
            db_path: default_db_path(),
            cover_ttl_secs: None,
            cache_timeout_ms: default_cache_timeout_ms(),
            purge_interval_secs: default_purge_interval_secs(),
            catalog_base_url: default_catalog_base_url(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Catalog timeout as Duration for use with reqwest.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache call deadline as Duration.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn cover_ttl(&self) -> Option<Duration> {
        self.cover_ttl_secs.map(Duration::from_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("BOOKCOVER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("BOOKCOVER_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }
}
