//! API error handling.
//!
//! Agents branch on exactly two failure kinds: `duplicate_agent` (abandon the
//! current identity, re-register) and `remote_access_failure` (log and retry
//! with backoff). Every internal fault collapses into the latter.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    DuplicateAgent(String),
    RemoteAccess(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::DuplicateAgent(msg) => (StatusCode::CONFLICT, "duplicate_agent", msg),
            ApiError::RemoteAccess(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "remote_access_failure", msg)
            }
        };

        let body = Json(json!({
            "kind": kind,
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<drydock_core::Error> for ApiError {
    fn from(err: drydock_core::Error) -> Self {
        match err {
            drydock_core::Error::DuplicateAgentIdentity(_) => {
                ApiError::DuplicateAgent(err.to_string())
            }
            _ => ApiError::RemoteAccess(err.to_string()),
        }
    }
}
