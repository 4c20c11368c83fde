//! Room lifecycle and administration handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::access::Role;
use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::tenant::RoomId;
use roomwiki_persistence::types::RoomUpdate;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::room_ctx;
use crate::error::RestResult;
use crate::extractors::RequireIdentity;
use crate::state::AppState;

/// Request body for room creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    /// Room identifier (becomes the tenant namespace).
    pub name: String,
    /// Human-facing name; defaults to the identifier.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Handler for `POST /rooms`.
///
/// Any authenticated user may create a room and becomes its Owner.
pub async fn room_create_handler<S>(
    State(state): State<AppState<S>>,
    RequireIdentity(identity): RequireIdentity,
    Json(body): Json<CreateRoomRequest>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let room_id = RoomId::new(&body.name)?;
    let display_name = body.display_name.as_deref().unwrap_or(&body.name);
    debug!(room = room_id.as_str(), creator = %identity.username, "Processing room create");

    let room = state
        .store()
        .create_room(&identity, &room_id, display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(room)).into_response())
}

/// Handler for `GET /rooms`.
///
/// Lists the rooms visible to the caller.
pub async fn room_list_handler<S>(
    State(state): State<AppState<S>>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let rooms = state.store().list_rooms_for(&identity).await?;
    Ok(Json(rooms).into_response())
}

/// Handler for `GET /rooms/{room}`.
pub async fn room_get_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Viewer)
        .await?;

    let room = state.store().get_room(ctx.room()).await?;
    Ok(Json(room).into_response())
}

/// Handler for `PUT /rooms/{room}`.
///
/// Applies partial room settings. Owner only.
pub async fn room_update_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
    Json(update): Json<RoomUpdate>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state.store().authorize_owner(Some(&identity), &ctx).await?;

    let room = state.store().update_room(ctx.room(), update).await?;
    Ok(Json(room).into_response())
}

/// Handler for `DELETE /rooms/{room}`.
///
/// Deletes the room and its entire namespace. Owner only.
pub async fn room_delete_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state.store().authorize_owner(Some(&identity), &ctx).await?;

    state.store().delete_room(ctx.room()).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Handler for `POST /rooms/{room}/toggle-public`.
///
/// Flips public sharing on or off. Owner only. Returns the active slug,
/// or null when sharing was just disabled.
pub async fn room_toggle_public_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state.store().authorize_owner(Some(&identity), &ctx).await?;

    let slug = state.store().toggle_public(ctx.room()).await?;
    debug!(room = ctx.room().as_str(), public = slug.is_some(), "Toggled public sharing");
    Ok(Json(json!({ "public_slug": slug })).into_response())
}

/// Handler for `GET /rooms/{room}/my-role`.
///
/// Reports the caller's effective role in the room. Superusers report
/// Owner everywhere.
pub async fn room_my_role_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    let role = if identity.is_superuser {
        Some(Role::Owner)
    } else {
        state
            .store()
            .membership_role(identity.user_id, ctx.room())
            .await?
    };
    Ok(Json(json!({ "role": role })).into_response())
}

/// Handler for `GET /rooms/{room}/users`.
///
/// Lists the room's memberships. Requires Admin.
pub async fn room_members_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Admin)
        .await?;

    let members = state.store().list_memberships(ctx.room()).await?;
    Ok(Json(members).into_response())
}
