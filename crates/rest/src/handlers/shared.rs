//! Tokenized shared-link access handler.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use roomwiki_persistence::store::WikiStore;
use serde_json::json;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for `GET /shared/{token}`.
///
/// Resolves a shared link to its page without authentication. Unknown
/// tokens return 404; expired ones return 410.
pub async fn shared_link_handler<S>(
    State(state): State<AppState<S>>,
    Path(token): Path<String>,
) -> RestResult<Response>
where
    S: WikiStore,
{
    let (link, page) = state.store().resolve_shared_link(&token).await?;
    debug!(room = link.room.as_str(), page = link.page_id, "Resolved shared link");
    Ok(Json(json!({
        "room": link.room,
        "expires_at": link.expires_at,
        "page": page,
    }))
    .into_response())
}
