//! Dual-window request quota.
//!
//! Each client identity gets a daily and a monthly counter in the shared
//! store, under `ratelimit:{ip}:daily` and `ratelimit:{ip}:monthly`. The first
//! request of a cycle creates the counter with add-if-absent and the cycle's
//! TTL; later requests increment it, and the store expires it when the cycle
//! ends. Any store failure admits the request without quota headers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bookcover_core::cache::bounded;
use bookcover_core::types::{DAILY_CYCLE, MONTHLY_CYCLE};
use bookcover_core::{AddOutcome, CacheStore, Error, RateLimitConfig};

use crate::error::ApiError;

const UNKNOWN_CLIENT: &str = "unknown";

static LIMIT_DAILY: HeaderName = HeaderName::from_static("x-ratelimit-limit-daily");
static REMAINING_DAILY: HeaderName = HeaderName::from_static("x-ratelimit-remaining-daily");
static LIMIT_MONTHLY: HeaderName = HeaderName::from_static("x-ratelimit-limit-monthly");
static REMAINING_MONTHLY: HeaderName = HeaderName::from_static("x-ratelimit-remaining-monthly");

/// Quota snapshot after counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub daily_limit: u64,
    pub daily_remaining: u64,
    pub monthly_limit: u64,
    pub monthly_remaining: u64,
}

impl Quota {
    fn new(config: &RateLimitConfig, daily: u64, monthly: u64) -> Self {
        Self {
            daily_limit: config.daily_limit,
            daily_remaining: config.daily_limit.saturating_sub(daily),
            monthly_limit: config.monthly_limit,
            monthly_remaining: config.monthly_limit.saturating_sub(monthly),
        }
    }

    /// Write the four `X-RateLimit-*` headers.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        headers.insert(LIMIT_DAILY.clone(), HeaderValue::from(self.daily_limit));
        headers.insert(REMAINING_DAILY.clone(), HeaderValue::from(self.daily_remaining));
        headers.insert(LIMIT_MONTHLY.clone(), HeaderValue::from(self.monthly_limit));
        headers.insert(REMAINING_MONTHLY.clone(), HeaderValue::from(self.monthly_remaining));
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Unlimited tier, nothing was counted.
    Unlimited,
    /// Counting failed; the request goes through without quota headers.
    FailOpen,
    Admit(Quota),
    Reject(Quota),
}

/// Counts requests per client against a [`RateLimitConfig`].
pub struct RateLimiter {
    store: Option<Arc<dyn CacheStore>>,
    config: RateLimitConfig,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(store: Option<Arc<dyn CacheStore>>, config: RateLimitConfig, timeout: Duration) -> Self {
        Self { store, config, timeout }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count one request for `client` and decide whether it may proceed.
    pub async fn check(&self, client: &str) -> Decision {
        if self.config.unlimited {
            return Decision::Unlimited;
        }

        let Some(store) = self.store.as_deref() else {
            tracing::warn!(client, "no counter store configured, admitting request");
            return Decision::FailOpen;
        };

        let counts = async {
            let daily = self.count(store, &format!("ratelimit:{client}:daily"), DAILY_CYCLE).await?;
            let monthly = self.count(store, &format!("ratelimit:{client}:monthly"), MONTHLY_CYCLE).await?;
            Ok::<_, Error>((daily, monthly))
        };

        let (daily, monthly) = match counts.await {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(client, error = %e, "rate limit counter failed, admitting request");
                return Decision::FailOpen;
            }
        };

        let quota = Quota::new(&self.config, daily, monthly);
        if daily > self.config.daily_limit || monthly > self.config.monthly_limit {
            tracing::info!(client, daily, monthly, "rate limit exceeded");
            Decision::Reject(quota)
        } else {
            Decision::Admit(quota)
        }
    }

    /// Bump the counter at `key`, creating it for a fresh cycle.
    ///
    /// When another request creates the counter first, the increment is
    /// retried exactly once.
    async fn count(&self, store: &dyn CacheStore, key: &str, cycle: Duration) -> Result<u64, Error> {
        if let Some(count) = self.increment(store, key).await? {
            return Ok(count);
        }

        match bounded(self.timeout, "add", store.add(key, "1", cycle)).await? {
            AddOutcome::Stored => Ok(1),
            AddOutcome::AlreadyExists => self
                .increment(store, key)
                .await?
                .ok_or_else(|| Error::CounterVanished(key.to_string())),
        }
    }

    async fn increment(&self, store: &dyn CacheStore, key: &str) -> Result<Option<u64>, Error> {
        bounded(self.timeout, "increment", store.increment(key, 1)).await
    }
}

/// Resolve the client identity used as the counter key.
///
/// Proxy headers win over the transport peer, in the order
/// `CF-Connecting-IP`, first `X-Forwarded-For` hop, `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(ip) = header("cf-connecting-ip") {
        return ip.to_string();
    }

    if let Some(forwarded) = header("x-forwarded-for")
        && let Some(first) = forwarded.split(',').next().map(str::trim)
        && !first.is_empty()
    {
        return first.to_string();
    }

    if let Some(ip) = header("x-real-ip") {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Middleware enforcing the quota on the routes it wraps.
pub async fn enforce(State(limiter): State<Arc<RateLimiter>>, request: Request, next: Next) -> Response {
    let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
    let client = client_ip(request.headers(), peer);

    match limiter.check(&client).await {
        Decision::Unlimited | Decision::FailOpen => next.run(request).await,
        Decision::Admit(quota) => {
            let mut response = next.run(request).await;
            quota.write_headers(response.headers_mut());
            response
        }
        Decision::Reject(quota) => {
            let mut response = ApiError::RateLimited.into_response();
            quota.write_headers(response.headers_mut());
            response
        }
    }
}
