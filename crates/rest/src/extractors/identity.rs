//! Bearer-token identity extractors.
//!
//! Callers authenticate with `Authorization: Bearer <token>`. The token is
//! opaque; it is looked up against the user directory and never parsed.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use roomwiki_persistence::error::WikiError;
use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::types::Identity;

use crate::error::RestError;
use crate::state::AppState;

/// Axum extractor that requires an authenticated identity.
///
/// Rejects with 401 when the header is missing, malformed, or the token is
/// unknown.
///
/// # Example
///
/// ```rust,ignore
/// use roomwiki_rest::extractors::RequireIdentity;
///
/// async fn handler(RequireIdentity(identity): RequireIdentity) {
///     println!("user: {}", identity.username);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn resolve<S>(state: &AppState<S>, token: &str) -> Result<Identity, RestError>
where
    S: WikiStore,
{
    let user = state
        .store()
        .user_by_token(token)
        .await?
        .ok_or(WikiError::Unauthenticated)?;
    Ok(Identity::from(&user))
}

impl<S> FromRequestParts<AppState<S>> for RequireIdentity
where
    S: WikiStore + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(WikiError::Unauthenticated)?;
        Ok(RequireIdentity(resolve(state, token).await?))
    }
}
