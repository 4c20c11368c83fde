//! Error types for the wiki REST API.
//!
//! This module defines the API-facing error type and its mapping from
//! storage errors to HTTP status codes. Every error is rendered as a
//! JSON body of the form `{"error": "<message>"}`.
//!
//! # Error Mapping
//!
//! | Storage Error | HTTP Status |
//! |--------------|-------------|
//! | InvalidTenant | 400 |
//! | Validation | 400 |
//! | Unauthenticated | 401 |
//! | Forbidden | 403 |
//! | NotFound | 404 |
//! | Conflict | 409 |
//! | Gone | 410 |
//! | Backend | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::error::WikiError;
use serde_json::json;
use std::fmt;
use tracing::error;

/// The primary error type for REST API operations.
///
/// Wraps the storage layer's error taxonomy; the REST layer adds only its
/// own bad-request variant for malformed inputs that never reach storage.
#[derive(Debug)]
pub enum RestError {
    /// Bad request at the HTTP layer (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// An error propagated from the storage layer.
    Storage(WikiError),
}

impl RestError {
    /// Shorthand for a bad-request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        RestError::BadRequest {
            message: message.into(),
        }
    }

    /// The HTTP status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RestError::Storage(err) => match err {
                WikiError::InvalidTenant { .. } | WikiError::Validation { .. } => {
                    StatusCode::BAD_REQUEST
                }
                WikiError::Unauthenticated => StatusCode::UNAUTHORIZED,
                WikiError::Forbidden { .. } => StatusCode::FORBIDDEN,
                WikiError::NotFound { .. } => StatusCode::NOT_FOUND,
                WikiError::Conflict { .. } => StatusCode::CONFLICT,
                WikiError::Gone { .. } => StatusCode::GONE,
                WikiError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RestError::Storage(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for RestError {}

impl From<WikiError> for RestError {
    fn from(err: WikiError) -> Self {
        RestError::Storage(err)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Backend details stay in the log; the client gets a generic message.
        let message = match &self {
            RestError::Storage(WikiError::Backend { .. }) => {
                error!(error = %self, "storage backend error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RestError::bad_request("nope"), StatusCode::BAD_REQUEST),
            (
                RestError::Storage(WikiError::Unauthenticated),
                StatusCode::UNAUTHORIZED,
            ),
            (
                RestError::Storage(WikiError::forbidden("requires Editor")),
                StatusCode::FORBIDDEN,
            ),
            (
                RestError::Storage(WikiError::not_found("page", "7")),
                StatusCode::NOT_FOUND,
            ),
            (
                RestError::Storage(WikiError::conflict("taken")),
                StatusCode::CONFLICT,
            ),
            (
                RestError::Storage(WikiError::validation("bad slug")),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_invalid_tenant_is_bad_request() {
        let err = RestError::Storage(WikiError::InvalidTenant {
            tenant: "a;b".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
