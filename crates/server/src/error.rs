//! Structured errors for the HTTP layer.
//!
//! [`ApiError`] wraps the core error and adds the failures that only exist at
//! the HTTP boundary. Every variant renders as the JSON error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bookcover_core::Error;

use crate::response::{self, INTERNAL_SERVER_ERROR};

pub const ROUTE_NOT_SUPPORTED: &str = "Route is not supported yet.";
pub const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed.";
pub const CONFLICTING_PARAMS: &str = "Use either isbn or book_title and author_name, not both.";

/// Structured errors for the bookcover API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Validation, lookup or cache failure from the core crates.
    #[error(transparent)]
    Core(#[from] Error),

    /// Request quota exhausted for the client.
    #[error("RATE_LIMITED: Rate limit exceeded")]
    RateLimited,

    #[error("METHOD_NOT_ALLOWED: Method not allowed.")]
    MethodNotAllowed,

    #[error("ROUTE_NOT_SUPPORTED: Route is not supported yet.")]
    RouteNotSupported,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Core(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Core(Error::FetchFailed(_) | Error::FetchTooLarge(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::RouteNotSupported => StatusCode::NOT_FOUND,
        }
    }

    /// Message placed in the envelope. Internal failures never leak their detail.
    pub fn message(&self) -> String {
        match self {
            ApiError::Core(err) if err.is_cache_error() => INTERNAL_SERVER_ERROR.to_string(),
            ApiError::Core(err) => err.message(),
            ApiError::RateLimited => RATE_LIMIT_EXCEEDED.to_string(),
            ApiError::MethodNotAllowed => METHOD_NOT_ALLOWED.to_string(),
            ApiError::RouteNotSupported => ROUTE_NOT_SUPPORTED.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match status {
            StatusCode::BAD_GATEWAY => tracing::warn!(error = %self, "catalog fetch failed"),
            s if s.is_server_error() => tracing::error!(error = %self, "request failed"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }
        response::error(status, &self.message())
    }
}
