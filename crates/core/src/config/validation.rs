//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `cache_timeout_ms` is 0 or exceeds 1 minute
    /// - `purge_interval_secs` is 0
    /// - `user_agent` is empty
    /// - `catalog_base_url` is not an http(s) URL
    /// - a bounded rate limit tier has a zero limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.cache_timeout_ms == 0 || self.cache_timeout_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "cache_timeout_ms".into(),
                reason: "must be between 1ms and 1 minute".into(),
            });
        }

        if self.purge_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "purge_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if !(self.catalog_base_url.starts_with("https://") || self.catalog_base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "catalog_base_url".into(),
                reason: "must be an http or https URL".into(),
            });
        }

        let limits = &self.rate_limit;
        if !limits.unlimited {
            if limits.daily_limit == 0 {
                return Err(ConfigError::Invalid {
                    field: "rate_limit.daily_limit".into(),
                    reason: "must be greater than 0 unless unlimited".into(),
                });
            }
            if limits.monthly_limit == 0 {
                return Err(ConfigError::Invalid {
                    field: "rate_limit.monthly_limit".into(),
                    reason: "must be greater than 0 unless unlimited".into(),
                });
            }
            if limits.daily_limit > limits.monthly_limit {
                tracing::warn!(
                    daily_limit = limits.daily_limit,
                    monthly_limit = limits.monthly_limit,
                    "daily limit exceeds monthly limit; the monthly limit will bind first"
                );
            }
        }

        Ok(())
    }
}
