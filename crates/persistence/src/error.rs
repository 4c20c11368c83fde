//! Error types for the persistence layer.
//!
//! The taxonomy separates caller mistakes (invalid tenant, validation),
//! authorization failures, entity state (not found, conflict, gone), and
//! backend faults. Storage-level uniqueness violations are always translated
//! into [`WikiError::Conflict`] by the backends, never surfaced raw.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all wiki storage and authorization operations.
#[derive(Error, Debug)]
pub enum WikiError {
    /// The tenant identifier failed charset validation. Rejected before any
    /// namespace-qualified operation runs.
    #[error("invalid tenant identifier: {tenant}")]
    InvalidTenant { tenant: String },

    /// No user identity was presented.
    #[error("authentication required")]
    Unauthenticated,

    /// The authenticated user lacks the required role or ownership.
    #[error("{message}")]
    Forbidden { message: String },

    /// The requested entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A uniqueness constraint was violated (slug, path, tenant name, slug of
    /// a public link).
    #[error("{message}")]
    Conflict { message: String },

    /// The entity existed but is no longer valid (expired shared link).
    /// Distinct from [`WikiError::NotFound`] so clients can tell "never
    /// existed" from "no longer valid".
    #[error("{message}")]
    Gone { message: String },

    /// Malformed input payload.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Backend-specific failure.
    #[error("backend error ({backend_name}): {message}")]
    Backend {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl WikiError {
    /// Shorthand for a [`WikiError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        WikiError::NotFound {
            entity,
            key: key.into(),
        }
    }

    /// Shorthand for a [`WikiError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        WikiError::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a [`WikiError::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        WikiError::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for a [`WikiError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        WikiError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an internal backend failure.
    pub fn backend(backend_name: &str, message: impl Into<String>) -> Self {
        WikiError::Backend {
            backend_name: backend_name.to_string(),
            message: message.into(),
            source: None,
        }
    }
}

/// Result type alias for wiki operations.
pub type WikiResult<T> = Result<T, WikiError>;

// Implement conversions from common error types

impl From<serde_json::Error> for WikiError {
    fn from(err: serde_json::Error) -> Self {
        WikiError::Backend {
            backend_name: "serde".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for WikiError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;
        // Uniqueness violations are part of the public contract: two
        // concurrent creators both pass any application-level check, so the
        // constraint is the authoritative arbiter.
        if let rusqlite::Error::SqliteFailure(e, ref msg) = err {
            if e.code == ErrorCode::ConstraintViolation {
                return WikiError::Conflict {
                    message: msg
                        .clone()
                        .unwrap_or_else(|| "uniqueness constraint violated".to_string()),
                };
            }
        }
        WikiError::Backend {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for WikiError {
    fn from(err: r2d2::Error) -> Self {
        WikiError::Backend {
            backend_name: "sqlite".to_string(),
            message: format!("connection pool error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for WikiError {
    fn from(err: tokio_postgres::Error) -> Self {
        use tokio_postgres::error::SqlState;
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            let detail = err
                .as_db_error()
                .map(|e| e.message().to_string())
                .unwrap_or_else(|| "uniqueness constraint violated".to_string());
            return WikiError::Conflict { message: detail };
        }
        WikiError::Backend {
            backend_name: "postgres".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for WikiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        WikiError::Backend {
            backend_name: "postgres".to_string(),
            message: format!("connection pool error: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = WikiError::not_found("page", "42");
        assert_eq!(err.to_string(), "page not found: 42");
    }

    #[test]
    fn test_invalid_tenant_display() {
        let err = WikiError::InvalidTenant {
            tenant: "a;drop".to_string(),
        };
        assert_eq!(err.to_string(), "invalid tenant identifier: a;drop");
    }

    #[test]
    fn test_conflict_shorthand() {
        let err = WikiError::conflict("slug taken");
        assert!(matches!(err, WikiError::Conflict { .. }));
        assert_eq!(err.to_string(), "slug taken");
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_sqlite_constraint_maps_to_conflict() {
        let raw = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ErrorCode::ConstraintViolation,
                extended_code: 2067,
            },
            Some("UNIQUE constraint failed: pages.slug".to_string()),
        );
        let err: WikiError = raw.into();
        assert!(matches!(err, WikiError::Conflict { .. }));
    }
}
