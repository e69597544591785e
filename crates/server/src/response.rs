//! JSON response envelope.
//!
//! Success bodies are `{"url": "..."}` and failures `{"error": "..."}`.
//! Bodies are written with `serde_json`, which leaves `&`, `<` and `>` as-is.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error. Please, try again later.";

#[derive(Debug, Serialize)]
struct Success<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct Failure<'a> {
    error: &'a str,
}

/// 200 with the resolved cover URL.
pub fn success(url: &str) -> Response {
    encode(StatusCode::OK, &Success { url })
}

/// Error envelope with the given status.
pub fn error(status: StatusCode, message: &str) -> Response {
    encode(status, &Failure { error: message })
}

fn encode<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => json(status, bytes),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode response envelope");
            let fallback = format!(r#"{{"error":"{INTERNAL_SERVER_ERROR}"}}"#);
            json(StatusCode::INTERNAL_SERVER_ERROR, fallback.into_bytes())
        }
    }
}

fn json(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response()
}
