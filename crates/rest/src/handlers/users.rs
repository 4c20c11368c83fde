//! User administration handlers. Superuser only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::access::Role;
use roomwiki_persistence::error::WikiError;
use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::tenant::RoomId;
use roomwiki_persistence::types::Identity;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::RestResult;
use crate::extractors::RequireIdentity;
use crate::state::AppState;

fn require_superuser(identity: &Identity) -> RestResult<()> {
    if identity.is_superuser {
        Ok(())
    } else {
        Err(WikiError::forbidden("requires superuser").into())
    }
}

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Unique username.
    pub username: String,
    /// Bearer token; generated when omitted.
    #[serde(default)]
    pub token: Option<String>,
    /// Grant platform-wide superuser rights.
    #[serde(default)]
    pub is_superuser: bool,
}

/// A single membership grant in a replace-rooms request.
#[derive(Debug, Deserialize)]
pub struct RoomGrant {
    /// Room name, or the all-rooms sentinel.
    pub room: String,
    /// Role in that room.
    pub role: Role,
}

/// Handler for `POST /users`.
///
/// Creates a user. The response is the only place the token is ever
/// returned.
pub async fn user_create_handler<S>(
    State(state): State<AppState<S>>,
    RequireIdentity(identity): RequireIdentity,
    Json(body): Json<CreateUserRequest>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    require_superuser(&identity)?;

    let token = body
        .token
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let user = state
        .store()
        .create_user(&body.username, &token, body.is_superuser)
        .await?;
    info!(username = %user.username, superuser = user.is_superuser, "Created user");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "username": user.username,
            "is_superuser": user.is_superuser,
            "token": token,
        })),
    )
        .into_response())
}

/// Handler for `GET /users`.
pub async fn user_list_handler<S>(
    State(state): State<AppState<S>>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    require_superuser(&identity)?;
    let users = state.store().list_users().await?;
    Ok(Json(users).into_response())
}

/// Handler for `DELETE /users/{id}`.
///
/// Removes the user and all their memberships.
pub async fn user_delete_handler<S>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    require_superuser(&identity)?;
    state.store().delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Handler for `PUT /users/{id}/rooms`.
///
/// Replaces the user's memberships wholesale with the supplied grants.
pub async fn user_rooms_handler<S>(
    State(state): State<AppState<S>>,
    Path(user_id): Path<i64>,
    RequireIdentity(identity): RequireIdentity,
    Json(grants): Json<Vec<RoomGrant>>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    require_superuser(&identity)?;

    let rooms = grants
        .into_iter()
        .map(|g| Ok((RoomId::new(g.room)?, g.role)))
        .collect::<Result<Vec<_>, WikiError>>()?;
    state.store().replace_user_rooms(user_id, &rooms).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
