//! Unified error types for the bookcover API.
//!
//! Each variant carries the message that is reported to clients; the
//! `Display` form prefixes it with a stable error code for logs.

use tokio_rusqlite::rusqlite;

/// Unified error types for the bookcover API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (missing title, bad ISBN, ...).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The catalog returned no matching cover.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// The catalog could not be reached or answered with an error status.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A cache call did not finish within its deadline.
    #[error("CACHE_TIMEOUT: {0}")]
    CacheTimeout(String),

    /// Increment was called on a value that is not an unsigned integer.
    #[error("CACHE_ERROR: value at {0} is not a counter")]
    InvalidCounter(String),

    /// A counter vanished between add-if-absent and the follow-up increment.
    #[error("CACHE_ERROR: counter {0} disappeared before it could be incremented")]
    CounterVanished(String),
}

impl Error {
    /// The bare message without the error code prefix.
    pub fn message(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::NotFound(msg)
            | Error::FetchFailed(msg)
            | Error::FetchTooLarge(msg)
            | Error::MigrationFailed(msg)
            | Error::CacheTimeout(msg) => msg.clone(),
            Error::Database(e) => e.to_string(),
            Error::InvalidCounter(key) => format!("value at {key} is not a counter"),
            Error::CounterVanished(key) => format!("counter {key} disappeared before it could be incremented"),
        }
    }

    /// Whether the error originates from the cache store rather than the lookup itself.
    pub fn is_cache_error(&self) -> bool {
        matches!(
            self,
            Error::Database(_)
                | Error::MigrationFailed(_)
                | Error::CacheTimeout(_)
                | Error::InvalidCounter(_)
                | Error::CounterVanished(_)
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("image was not found for ISBN 9780345376596".to_string());
        assert!(err.to_string().starts_with("NOT_FOUND"));
        assert!(err.to_string().contains("9780345376596"));
    }

    #[test]
    fn test_message_has_no_code_prefix() {
        let err = Error::InvalidInput("Invalid ISBN (please use ISBN-13)".to_string());
        assert_eq!(err.message(), "Invalid ISBN (please use ISBN-13)");
    }

    #[test]
    fn test_cache_error_classification() {
        assert!(Error::CacheTimeout("get".into()).is_cache_error());
        assert!(Error::InvalidCounter("ratelimit:1.1.1.1:daily".into()).is_cache_error());
        assert!(!Error::NotFound("x".into()).is_cache_error());
        assert!(!Error::FetchFailed("x".into()).is_cache_error());
    }
}
