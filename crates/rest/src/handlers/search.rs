//! Ranked search handler.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use roomwiki_persistence::access::Role;
use roomwiki_persistence::store::WikiStore;
use serde::Deserialize;
use tracing::debug;

use super::room_ctx;
use crate::error::RestResult;
use crate::extractors::RequireIdentity;
use crate::state::AppState;

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// The search term.
    #[serde(default)]
    pub q: String,
}

/// Handler for `GET /rooms/{room}/search?q=`.
///
/// Runs ranked search within the room: exact title matches first, then
/// title containment, then content-only matches. A blank query matches
/// nothing.
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    Path(room): Path<String>,
    Query(query): Query<SearchQuery>,
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

    let hits = state.store().search_pages(&ctx, &query.q).await?;
    debug!(room = ctx.room().as_str(), query = %query.q, hits = hits.len(), "Search complete");
    Ok(Json(hits).into_response())
}
