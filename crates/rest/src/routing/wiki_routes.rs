//! Wiki route configuration.
//!
//! Defines all routes for the wiki REST API.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use roomwiki_persistence::store::WikiStore;

use crate::handlers;
use crate::state::AppState;

/// Creates all wiki REST API routes.
///
/// # Routes
///
/// ## Rooms
/// - `POST /rooms` - Create a room (caller becomes Owner)
/// - `GET /rooms` - Rooms visible to the caller
/// - `GET /rooms/{room}` - Room details
/// - `PUT /rooms/{room}` - Update room settings (Owner)
/// - `DELETE /rooms/{room}` - Delete room and namespace (Owner)
/// - `POST /rooms/{room}/toggle-public` - Rotate or clear the public slug (Owner)
/// - `GET /rooms/{room}/my-role` - Caller's effective role
/// - `GET /rooms/{room}/users` - Memberships (Admin)
///
/// ## Pages
/// - `GET /rooms/{room}/pages` - All pages in path order
/// - `POST /rooms/{room}/pages` - Create page (Editor)
/// - `GET /rooms/{room}/pages/tree` - Page forest
/// - `GET /rooms/{room}/pages/{id}` - Read page
/// - `GET /rooms/{room}/pages/by-slug/{slug}` - Read page by slug
/// - `PUT /rooms/{room}/pages/{id}` - Update / relocate page (Editor)
/// - `DELETE /rooms/{room}/pages/{id}` - Delete page (Admin)
/// - `GET /rooms/{room}/pages/{id}/versions` - Version history
/// - `POST /rooms/{room}/pages/{id}/share` - Issue shared link (Editor)
/// - `GET /rooms/{room}/search` - Ranked search
///
/// ## Unauthenticated
/// - `GET /shared/{token}` - Resolve a shared link
/// - `GET /public/{slug}` - Public room summary
/// - `GET /public/{slug}/pages` - Public page tree
/// - `GET /public/{slug}/pages/{id}` - Public page
/// - `POST /feedback` - Submit feedback
///
/// ## Administration
/// - `GET /users`, `POST /users`, `DELETE /users/{id}` - User directory (superuser)
/// - `PUT /users/{id}/rooms` - Wholesale membership replacement (superuser)
/// - `GET /feedback/{room}`, `GET /feedback/{room}/count` - Feedback (Admin)
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: WikiStore + 'static,
{
    Router::new()
        // System
        .route("/health", get(handlers::health_handler::<S>))
        // Rooms
        .route("/rooms", post(handlers::room_create_handler::<S>))
        .route("/rooms", get(handlers::room_list_handler::<S>))
        .route("/rooms/{room}", get(handlers::room_get_handler::<S>))
        .route("/rooms/{room}", put(handlers::room_update_handler::<S>))
        .route("/rooms/{room}", delete(handlers::room_delete_handler::<S>))
        .route(
            "/rooms/{room}/toggle-public",
            post(handlers::room_toggle_public_handler::<S>),
        )
        .route(
            "/rooms/{room}/my-role",
            get(handlers::room_my_role_handler::<S>),
        )
        .route(
            "/rooms/{room}/users",
            get(handlers::room_members_handler::<S>),
        )
        // Pages
        .route("/rooms/{room}/pages", get(handlers::page_list_handler::<S>))
        .route(
            "/rooms/{room}/pages",
            post(handlers::page_create_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/tree",
            get(handlers::page_tree_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/by-slug/{slug}",
            get(handlers::page_get_by_slug_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/{id}",
            get(handlers::page_get_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/{id}",
            put(handlers::page_update_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/{id}",
            delete(handlers::page_delete_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/{id}/versions",
            get(handlers::page_versions_handler::<S>),
        )
        .route(
            "/rooms/{room}/pages/{id}/share",
            post(handlers::page_share_handler::<S>),
        )
        .route("/rooms/{room}/search", get(handlers::search_handler::<S>))
        // Shared / public access
        .route("/shared/{token}", get(handlers::shared_link_handler::<S>))
        .route("/public/{slug}", get(handlers::public_room_handler::<S>))
        .route(
            "/public/{slug}/pages",
            get(handlers::public_tree_handler::<S>),
        )
        .route(
            "/public/{slug}/pages/{id}",
            get(handlers::public_page_handler::<S>),
        )
        // User administration
        .route("/users", get(handlers::user_list_handler::<S>))
        .route("/users", post(handlers::user_create_handler::<S>))
        .route("/users/{id}", delete(handlers::user_delete_handler::<S>))
        .route("/users/{id}/rooms", put(handlers::user_rooms_handler::<S>))
        // Feedback
        .route("/feedback", post(handlers::feedback_submit_handler::<S>))
        .route(
            "/feedback/{room}",
            get(handlers::feedback_list_handler::<S>),
        )
        .route(
            "/feedback/{room}/count",
            get(handlers::feedback_count_handler::<S>),
        )
        // State
        .with_state(state)
}
