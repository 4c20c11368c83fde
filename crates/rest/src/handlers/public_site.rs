//! Read-only public room view handlers.
//!
//! Rooms with sharing toggled on are reachable anonymously under their
//! opaque public slug. The slug reveals nothing about the room name, and
//! a cleared slug never resolves again.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::tenant::NamespaceContext;
use roomwiki_persistence::tree;
use serde_json::json;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for `GET /public/{slug}`.
///
/// Returns the room's public presentation.
pub async fn public_room_handler<S>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let room = state.store().room_by_public_slug(&slug).await?;
    Ok(Json(json!({
        "display_name": room.display_name,
        "public_title": room.public_title,
        "public_subtitle": room.public_subtitle,
        "logo_url": room.logo_url,
        "welcome_page_id": room.welcome_page_id,
    }))
    .into_response())
}

/// Handler for `GET /public/{slug}/pages`.
///
/// Returns the shared room's page hierarchy as a forest.
pub async fn public_tree_handler<S>(
    State(state): State<AppState<S>>,
    Path(slug): Path<String>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let room = state.store().room_by_public_slug(&slug).await?;
    let ctx = NamespaceContext::resolve(room.name);
    let pages = state.store().list_pages(&ctx).await?;
    Ok(Json(tree::build_tree(&pages)).into_response())
}

/// Handler for `GET /public/{slug}/pages/{id}`.
///
/// Returns one page from a publicly shared room.
pub async fn public_page_handler<S>(
    State(state): State<AppState<S>>,
    Path((slug, id)): Path<(String, i64)>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let room = state.store().room_by_public_slug(&slug).await?;
    let ctx = NamespaceContext::resolve(room.name);
    let page = state.store().get_page(&ctx, id).await?;
    Ok(Json(page).into_response())
}
