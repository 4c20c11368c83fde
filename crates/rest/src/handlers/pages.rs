//! Page CRUD, tree, version and sharing handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomwiki_persistence::access::Role;
use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::tree;
use roomwiki_persistence::types::{NewPage, PageUpdate};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::room_ctx;
use crate::error::RestResult;
use crate::extractors::RequireIdentity;
use crate::state::AppState;

/// Handler for `POST /rooms/{room}/pages`.
///
/// Creates a page under the optional parent path. Requires Editor.
pub async fn page_create_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    RequireIdentity(identity): RequireIdentity,
    Json(body): Json<NewPage>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Editor)
        .await?;

    debug!(
        room = ctx.room().as_str(),
        slug = %body.slug,
        parent = body.parent_path.as_deref().unwrap_or(""),
        "Processing page create"
    );
    let page = state.store().create_page(&ctx, &identity, body).await?;
    Ok((StatusCode::CREATED, Json(page)).into_response())
}

/// Handler for `GET /rooms/{room}/pages`.
///
/// Lists all pages in path order.
pub async fn page_list_handler<S>(
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

    let pages = state.store().list_pages(&ctx).await?;
    Ok(Json(pages).into_response())
}

/// Handler for `GET /rooms/{room}/pages/tree`.
///
/// Returns the page hierarchy as a forest of nested nodes.
pub async fn page_tree_handler<S>(
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

    let pages = state.store().list_pages(&ctx).await?;
    Ok(Json(tree::build_tree(&pages)).into_response())
}

/// Handler for `GET /rooms/{room}/pages/{id}`.
pub async fn page_get_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, id)): Path<(String, i64)>,
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

    let page = state.store().get_page(&ctx, id).await?;
    Ok(Json(page).into_response())
}

/// Handler for `GET /rooms/{room}/pages/by-slug/{slug}`.
pub async fn page_get_by_slug_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, slug)): Path<(String, String)>,
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

    let page = state.store().get_page_by_slug(&ctx, &slug).await?;
    Ok(Json(page).into_response())
}

/// Handler for `PUT /rooms/{room}/pages/{id}`.
///
/// Applies a partial update; slug or parent changes relocate the whole
/// subtree. Requires Editor.
pub async fn page_update_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, id)): Path<(String, i64)>,
    RequireIdentity(identity): RequireIdentity,
    Json(update): Json<PageUpdate>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Editor)
        .await?;

    let page = state.store().update_page(&ctx, &identity, id, update).await?;
    Ok(Json(page).into_response())
}

/// Handler for `DELETE /rooms/{room}/pages/{id}`.
///
/// Deletes a leaf page. Requires Admin; pages with children are refused.
pub async fn page_delete_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, id)): Path<(String, i64)>,
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

    state.store().delete_page(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Handler for `GET /rooms/{room}/pages/{id}/versions`.
///
/// Version history, newest first.
pub async fn page_versions_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, id)): Path<(String, i64)>,
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

    let versions = state.store().list_versions(&ctx, id).await?;
    Ok(Json(versions).into_response())
}

/// Request body for creating a shared link.
#[derive(Debug, Default, Deserialize)]
pub struct ShareRequest {
    /// Days until the link expires; omit for a link that never expires.
    #[serde(default)]
    pub expires_in_days: Option<i64>,
}

/// Handler for `POST /rooms/{room}/pages/{id}/share`.
///
/// Issues a tokenized link to a single page. Requires Viewer; anyone who
/// can read the page may share it.
pub async fn page_share_handler<S>(
    State(state): State<AppState<S>>,
    Path((room, id)): Path<(String, i64)>,
    RequireIdentity(identity): RequireIdentity,
    Json(body): Json<ShareRequest>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let ctx = room_ctx(&state, &room).await?;
    state
        .store()
        .authorize(Some(&identity), &ctx, Role::Viewer)
        .await?;

    let link = state
        .store()
        .create_shared_link(&ctx, id, body.expires_in_days)
        .await?;
    let url = format!("{}/shared/{}", state.base_url(), link.token);
    debug!(room = ctx.room().as_str(), page = id, "Issued shared link");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": link.token,
            "url": url,
            "expires_at": link.expires_at,
        })),
    )
        .into_response())
}
