//! Core wiki storage trait.
//!
//! [`WikiStore`] defines every operation the platform performs against
//! storage. Namespaced operations take a [`NamespaceContext`] as their first
//! parameter so tenant isolation is enforced at the type level; there is no
//! escape hatch.

use async_trait::async_trait;

use crate::access::{self, Role};
use crate::error::WikiResult;
use crate::search::SearchHit;
use crate::tenant::{NamespaceContext, RoomId};
use crate::types::{
    Feedback, Identity, Membership, NewPage, Page, PageUpdate, PageVersion, Room, RoomUpdate,
    SharedLink, User,
};

/// Maximum number of version records returned per page.
pub const VERSION_LIST_LIMIT: usize = 50;

/// Storage operations for the multi-tenant wiki.
///
/// Shared-namespace entities (users, rooms, memberships, shared links,
/// feedback) are addressed directly; page operations resolve through a
/// [`NamespaceContext`]. Uniqueness (room name, page slug, page path,
/// public slug) is enforced by constraints in the backing store and
/// surfaced as [`WikiError::Conflict`](crate::error::WikiError::Conflict).
#[async_trait]
pub trait WikiStore: Send + Sync {
    /// Human-readable backend name.
    fn backend_name(&self) -> &'static str;

    // ---- namespace lifecycle ----

    /// Ensures the namespace's tenant-scoped structures (pages, page
    /// versions) exist, mirroring the shared page schema. Idempotent and
    /// safe under concurrent first access; a no-op for the shared
    /// namespace. Namespaces are provisioned when their room is created;
    /// this is the operational hook for re-provisioning after a partial
    /// restore.
    async fn ensure_namespace(&self, ctx: &NamespaceContext) -> WikiResult<()>;

    // ---- users ----

    async fn create_user(
        &self,
        username: &str,
        token: &str,
        is_superuser: bool,
    ) -> WikiResult<User>;

    async fn list_users(&self) -> WikiResult<Vec<User>>;

    async fn delete_user(&self, user_id: i64) -> WikiResult<()>;

    /// Resolves an opaque bearer token to a user, or `None`.
    async fn user_by_token(&self, token: &str) -> WikiResult<Option<User>>;

    // ---- rooms ----

    /// Creates a room and grants the creator the Owner role. Also
    /// provisions the room's namespace.
    async fn create_room(
        &self,
        creator: &Identity,
        name: &RoomId,
        display_name: &str,
    ) -> WikiResult<Room>;

    async fn get_room(&self, name: &RoomId) -> WikiResult<Room>;

    async fn update_room(&self, name: &RoomId, update: RoomUpdate) -> WikiResult<Room>;

    /// Deletes a room, its namespace, and its membership rows.
    async fn delete_room(&self, name: &RoomId) -> WikiResult<()>;

    /// Toggles public sharing. Turning it on generates a fresh slug;
    /// turning it off clears the slug. Old slugs never come back.
    async fn toggle_public(&self, name: &RoomId) -> WikiResult<Option<String>>;

    /// Rooms visible to the identity: all rooms for superusers and holders
    /// of the all-rooms sentinel membership, otherwise rooms with an
    /// explicit membership row.
    async fn list_rooms_for(&self, identity: &Identity) -> WikiResult<Vec<Room>>;

    /// Resolves a public slug to its room.
    async fn room_by_public_slug(&self, slug: &str) -> WikiResult<Room>;

    // ---- memberships ----

    /// The user's role in a room, honoring the all-rooms sentinel.
    async fn membership_role(&self, user_id: i64, room: &RoomId) -> WikiResult<Option<Role>>;

    async fn list_memberships(&self, room: &RoomId) -> WikiResult<Vec<Membership>>;

    /// Replaces all of a user's memberships wholesale.
    async fn replace_user_rooms(
        &self,
        user_id: i64,
        rooms: &[(RoomId, Role)],
    ) -> WikiResult<()>;

    // ---- pages ----

    async fn create_page(
        &self,
        ctx: &NamespaceContext,
        author: &Identity,
        page: NewPage,
    ) -> WikiResult<Page>;

    async fn get_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<Page>;

    async fn get_page_by_slug(&self, ctx: &NamespaceContext, slug: &str) -> WikiResult<Page>;

    /// Applies a partial update. Slug/parent changes relocate the page and
    /// all strict descendants atomically; title/content changes snapshot
    /// the pre-update state as a new version first. Either everything
    /// commits or nothing does.
    async fn update_page(
        &self,
        ctx: &NamespaceContext,
        editor: &Identity,
        id: i64,
        update: PageUpdate,
    ) -> WikiResult<Page>;

    /// Deletes a page. Fails with Conflict when the page still has
    /// descendant pages; versions are retained as historical record.
    async fn delete_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<()>;

    /// All pages in the namespace, ordered by path.
    async fn list_pages(&self, ctx: &NamespaceContext) -> WikiResult<Vec<Page>>;

    /// Version history, newest first, capped at [`VERSION_LIST_LIMIT`].
    async fn list_versions(
        &self,
        ctx: &NamespaceContext,
        page_id: i64,
    ) -> WikiResult<Vec<PageVersion>>;

    // ---- search ----

    async fn search_pages(&self, ctx: &NamespaceContext, query: &str)
    -> WikiResult<Vec<SearchHit>>;

    // ---- shared links ----

    async fn create_shared_link(
        &self,
        ctx: &NamespaceContext,
        page_id: i64,
        expires_in_days: Option<i64>,
    ) -> WikiResult<SharedLink>;

    /// Resolves a shared token to its page. Unknown tokens are NotFound;
    /// expired ones are Gone.
    async fn resolve_shared_link(&self, token: &str) -> WikiResult<(SharedLink, Page)>;

    // ---- feedback ----

    async fn add_feedback(
        &self,
        room_name: &str,
        message: &str,
        author_name: Option<&str>,
        author_org: Option<&str>,
    ) -> WikiResult<Feedback>;

    async fn list_feedback(&self, room_name: &str) -> WikiResult<Vec<Feedback>>;

    async fn feedback_count(&self, room_name: &str) -> WikiResult<i64>;

    // ---- authorization (provided) ----

    /// Enforces a minimum-role requirement for the identity in this
    /// namespace, per the role hierarchy.
    async fn authorize(
        &self,
        identity: Option<&Identity>,
        ctx: &NamespaceContext,
        minimum: Role,
    ) -> WikiResult<()> {
        let membership = match identity {
            Some(ident) if !ident.is_superuser && !ctx.is_shared() => {
                self.membership_role(ident.user_id, ctx.room()).await?
            }
            _ => None,
        };
        access::check_access(identity, ctx, membership, minimum)
    }

    /// Enforces the Owner-or-superuser gate for destructive room
    /// administration.
    async fn authorize_owner(
        &self,
        identity: Option<&Identity>,
        ctx: &NamespaceContext,
    ) -> WikiResult<()> {
        let membership = match identity {
            Some(ident) if !ident.is_superuser => {
                self.membership_role(ident.user_id, ctx.room()).await?
            }
            _ => None,
        };
        access::check_owner(identity, ctx, membership)
    }
}
