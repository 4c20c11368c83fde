//! HTTP request handlers for the wiki API.
//!
//! This module contains handlers for all API operations:
//!
//! - [`rooms`] - Room lifecycle, settings, membership listing
//! - [`pages`] - Page CRUD, tree, versions, sharing
//! - [`search`] - Ranked search within a room
//! - [`shared`] - Tokenized per-page access
//! - [`public_site`] - Read-only public room views
//! - [`users`] - User administration
//! - [`feedback`] - Platform feedback
//! - [`health`] - Health check endpoint

pub mod feedback;
pub mod health;
pub mod pages;
pub mod public_site;
pub mod rooms;
pub mod search;
pub mod shared;
pub mod users;

// Re-export handlers for convenience
pub use feedback::{feedback_count_handler, feedback_list_handler, feedback_submit_handler};
pub use health::health_handler;
pub use pages::{
    page_create_handler, page_delete_handler, page_get_by_slug_handler, page_get_handler,
    page_list_handler, page_share_handler, page_tree_handler, page_update_handler,
    page_versions_handler,
};
pub use public_site::{public_page_handler, public_room_handler, public_tree_handler};
pub use rooms::{
    room_create_handler, room_delete_handler, room_get_handler, room_list_handler,
    room_members_handler, room_my_role_handler, room_toggle_public_handler, room_update_handler,
};
pub use search::search_handler;
pub use shared::shared_link_handler;
pub use users::{
    user_create_handler, user_delete_handler, user_list_handler, user_rooms_handler,
};

use roomwiki_persistence::store::WikiStore;
use roomwiki_persistence::tenant::{NamespaceContext, RoomId};

use crate::error::RestResult;
use crate::state::AppState;

/// Resolves a room path parameter to a namespace context.
///
/// Non-shared rooms must exist in the directory; the shared room never has
/// a directory row.
pub(crate) async fn room_ctx<S>(state: &AppState<S>, name: &str) -> RestResult<NamespaceContext>
where
    S: WikiStore,
{
    let room_id = RoomId::new(name)?;
    if !room_id.is_public() {
        state.store().get_room(&room_id).await?;
    }
    Ok(NamespaceContext::resolve(room_id))
}
