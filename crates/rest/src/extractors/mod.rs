//! Axum extractors for request identity.
//!
//! - [`RequireIdentity`] - Resolve the bearer token to a user, rejecting
//!   unauthenticated requests

mod identity;

pub use identity::RequireIdentity;
