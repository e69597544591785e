//! HTTP router for the bookcover API.
//!
//! Only the two bookcover routes count against the quota; unknown paths and
//! wrong methods are answered before the limiter runs.

use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;

use crate::lookup::LookupService;
use crate::middleware::{json_headers, log_requests};
use crate::ratelimit::{self, RateLimiter};
use crate::routes;

/// Build the application router.
pub fn router(lookup: LookupService, limiter: Arc<RateLimiter>) -> Router {
    let quota = from_fn_with_state(limiter, ratelimit::enforce);

    Router::new()
        .route(
            "/bookcover",
            get(routes::search)
                .route_layer(quota.clone())
                .fallback(routes::method_not_allowed),
        )
        .route(
            "/bookcover/{isbn}",
            get(routes::by_isbn)
                .route_layer(quota)
                .fallback(routes::method_not_allowed),
        )
        .fallback(routes::route_not_supported)
        .with_state(Arc::new(lookup))
        .layer(from_fn(json_headers))
        .layer(from_fn(log_requests))
}
