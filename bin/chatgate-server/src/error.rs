//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! **Security note:** authentication failures are collapsed into a single
//! generic 401 body regardless of cause (bad signature, expiry, inactive
//! account); the distinguishing detail is logged server-side only.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::relay::BackendError;

/// All errors that can occur in the chatgate-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request carried no credential, an invalid one, or one that
    /// resolved to a missing/inactive account.
    #[error("unauthorized")]
    Unauthorized,

    /// A uniqueness conflict, e.g. registering an already-taken username.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The inference backend could not be reached or rejected the request
    /// before any stream was established.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Propagated from the SQLite (or other) store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // One opaque message for every authentication failure.
            ServerError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "invalid authentication".to_owned())
            }

            // Client-facing errors: expose the message directly.
            ServerError::Conflict(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            // Internal errors: log the full detail, return a generic message
            // so file paths, SQL, or backend addresses never leak to clients.
            ServerError::Backend(e) => {
                error!(error = %e, "inference backend unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    "inference backend unavailable".to_owned(),
                )
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
