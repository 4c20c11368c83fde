//! WikiStore implementation for SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::access::Role;
use crate::error::{WikiError, WikiResult};
use crate::path::PagePath;
use crate::search::{self, SearchHit};
use crate::store::{VERSION_LIST_LIMIT, WikiStore};
use crate::tenant::{ALL_ROOMS, NamespaceContext, RoomId};
use crate::types::{
    Feedback, Identity, Membership, NewPage, Page, PageUpdate, PageVersion, Room, RoomUpdate,
    SharedLink, User,
};

use super::SqliteBackend;
use super::schema;

fn parse_ts(s: &str) -> WikiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| WikiError::backend("sqlite", format!("bad timestamp {}: {}", s, e)))
}

/// Remaps a constraint violation to a caller-facing conflict message,
/// passing other errors through the regular conversion.
fn remap_conflict(err: rusqlite::Error, message: &str) -> WikiError {
    match WikiError::from(err) {
        WikiError::Conflict { .. } => WikiError::conflict(message),
        other => other,
    }
}

/// Pages table name for a namespace. Namespace names come from validated
/// room identifiers, so interpolation is safe.
fn pages_table(ctx: &NamespaceContext) -> String {
    match ctx.namespace() {
        None => "pages".to_string(),
        Some(ns) => format!("{}_pages", ns),
    }
}

fn versions_table(ctx: &NamespaceContext) -> String {
    match ctx.namespace() {
        None => "page_versions".to_string(),
        Some(ns) => format!("{}_page_versions", ns),
    }
}

/// Raw page row as stored; converted to [`Page`] after the query closure.
type PageRow = (i64, String, String, String, String, String, String, String, String);

const PAGE_COLUMNS: &str =
    "id, title, slug, content, path, created_at, created_by, updated_at, updated_by";

fn read_page_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PageRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn build_page(row: PageRow) -> WikiResult<Page> {
    let (id, title, slug, content, path, created_at, created_by, updated_at, updated_by) = row;
    Ok(Page {
        id,
        title,
        slug,
        content: serde_json::from_str(&content)?,
        path: path.parse()?,
        created_at: parse_ts(&created_at)?,
        created_by,
        updated_at: parse_ts(&updated_at)?,
        updated_by,
    })
}

fn room_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoomRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

type RoomRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    String,
);

fn build_room(row: RoomRow) -> WikiResult<Room> {
    let (name, display_name, public_slug, logo_url, welcome_page_id, public_title, public_subtitle, created_at) =
        row;
    Ok(Room {
        name: RoomId::new(name)?,
        display_name,
        public_slug,
        logo_url,
        welcome_page_id,
        public_title,
        public_subtitle,
        created_at: parse_ts(&created_at)?,
    })
}

const ROOM_COLUMNS: &str =
    "name, display_name, public_slug, logo_url, welcome_page_id, public_title, public_subtitle, created_at";

impl SqliteBackend {
    fn load_page(
        &self,
        conn: &Connection,
        ctx: &NamespaceContext,
        id: i64,
    ) -> WikiResult<Page> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    PAGE_COLUMNS,
                    pages_table(ctx)
                ),
                params![id],
                read_page_row,
            )
            .optional()?
            .ok_or_else(|| WikiError::not_found("page", id.to_string()))?;
        build_page(row)
    }

    fn load_room(&self, conn: &Connection, name: &RoomId) -> WikiResult<Room> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM rooms WHERE name = ?1", ROOM_COLUMNS),
                params![name.as_str()],
                room_from_row,
            )
            .optional()?
            .ok_or_else(|| WikiError::not_found("room", name.as_str()))?;
        build_room(row)
    }
}

#[async_trait]
impl WikiStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn ensure_namespace(&self, ctx: &NamespaceContext) -> WikiResult<()> {
        let Some(ns) = ctx.namespace() else {
            return Ok(());
        };
        let conn = self.get_connection()?;
        schema::ensure_namespace_tables(&conn, ns)?;
        tracing::debug!(namespace = ns, "ensured tenant namespace");
        Ok(())
    }

    // ---- users ----

    async fn create_user(
        &self,
        username: &str,
        token: &str,
        is_superuser: bool,
    ) -> WikiResult<User> {
        if username.is_empty() {
            return Err(WikiError::validation("username must not be empty"));
        }
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO users (username, token, is_superuser) VALUES (?1, ?2, ?3)",
            params![username, token, is_superuser],
        )
        .map_err(|e| remap_conflict(e, &format!("username {} already taken", username)))?;
        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            is_superuser,
            token: Some(token.to_string()),
        })
    }

    async fn list_users(&self) -> WikiResult<Vec<User>> {
        let conn = self.get_connection()?;
        let mut stmt =
            conn.prepare("SELECT id, username, is_superuser FROM users ORDER BY username")?;
        let users = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    is_superuser: row.get(2)?,
                    token: None,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn delete_user(&self, user_id: i64) -> WikiResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM memberships WHERE user_id = ?1", params![user_id])?;
        let deleted = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        if deleted == 0 {
            return Err(WikiError::not_found("user", user_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    async fn user_by_token(&self, token: &str) -> WikiResult<Option<User>> {
        let conn = self.get_connection()?;
        let user = conn
            .query_row(
                "SELECT id, username, is_superuser FROM users WHERE token = ?1",
                params![token],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        is_superuser: row.get(2)?,
                        token: None,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    // ---- rooms ----

    async fn create_room(
        &self,
        creator: &Identity,
        name: &RoomId,
        display_name: &str,
    ) -> WikiResult<Room> {
        if name.is_public() || name.as_str() == ALL_ROOMS {
            return Err(WikiError::validation(format!(
                "room name {} is reserved",
                name
            )));
        }
        let ctx = NamespaceContext::resolve(name.clone());
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = Utc::now();

        // Room names differing only in letter case would collapse into one
        // namespace; refuse them before any row is written. Room names are
        // ASCII-only, so SQLite's lower() is exact here.
        let clash: Option<String> = tx
            .query_row(
                "SELECT name FROM rooms WHERE lower(name) = lower(?1)",
                params![name.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = clash {
            return Err(WikiError::conflict(format!(
                "room {} already exists as {}",
                name, existing
            )));
        }

        tx.execute(
            "INSERT INTO rooms (name, display_name, created_at) VALUES (?1, ?2, ?3)",
            params![name.as_str(), display_name, now.to_rfc3339()],
        )
        .map_err(|e| remap_conflict(e, &format!("room {} already exists", name)))?;

        tx.execute(
            "INSERT INTO memberships (user_id, room_name, role) VALUES (?1, ?2, ?3)",
            params![creator.user_id, name.as_str(), Role::Owner.as_str()],
        )?;

        // Provision the namespace inside the same transaction so a failed
        // create leaves nothing behind.
        if let Some(ns) = ctx.namespace() {
            schema::ensure_namespace_tables(&tx, ns)?;
        }
        tx.commit()?;

        tracing::info!(room = name.as_str(), creator = %creator.username, "created room");
        self.load_room(&conn, name)
    }

    async fn get_room(&self, name: &RoomId) -> WikiResult<Room> {
        let conn = self.get_connection()?;
        self.load_room(&conn, name)
    }

    async fn update_room(&self, name: &RoomId, update: RoomUpdate) -> WikiResult<Room> {
        let conn = self.get_connection()?;
        let mut room = self.load_room(&conn, name)?;

        if let Some(display_name) = update.display_name {
            room.display_name = display_name;
        }
        if let Some(logo_url) = update.logo_url {
            room.logo_url = logo_url;
        }
        if let Some(welcome_page_id) = update.welcome_page_id {
            room.welcome_page_id = welcome_page_id;
        }
        if let Some(public_title) = update.public_title {
            room.public_title = public_title;
        }
        if let Some(public_subtitle) = update.public_subtitle {
            room.public_subtitle = public_subtitle;
        }

        conn.execute(
            "UPDATE rooms SET display_name = ?1, logo_url = ?2, welcome_page_id = ?3,
             public_title = ?4, public_subtitle = ?5 WHERE name = ?6",
            params![
                room.display_name,
                room.logo_url,
                room.welcome_page_id,
                room.public_title,
                room.public_subtitle,
                name.as_str()
            ],
        )?;
        Ok(room)
    }

    async fn delete_room(&self, name: &RoomId) -> WikiResult<()> {
        let ctx = NamespaceContext::resolve(name.clone());
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let deleted = tx.execute("DELETE FROM rooms WHERE name = ?1", params![name.as_str()])?;
        if deleted == 0 {
            return Err(WikiError::not_found("room", name.as_str()));
        }
        tx.execute(
            "DELETE FROM memberships WHERE room_name = ?1",
            params![name.as_str()],
        )?;
        tx.execute(
            "DELETE FROM shared_links WHERE room_name = ?1",
            params![name.as_str()],
        )?;
        if let Some(ns) = ctx.namespace() {
            schema::drop_namespace_tables(&tx, ns)?;
        }
        tx.commit()?;

        tracing::info!(room = name.as_str(), "deleted room and namespace");
        Ok(())
    }

    async fn toggle_public(&self, name: &RoomId) -> WikiResult<Option<String>> {
        let conn = self.get_connection()?;
        let room = self.load_room(&conn, name)?;

        let new_slug = match room.public_slug {
            // Turning off: the old slug is gone for good.
            Some(_) => None,
            None => Some(
                uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
            ),
        };
        conn.execute(
            "UPDATE rooms SET public_slug = ?1 WHERE name = ?2",
            params![new_slug, name.as_str()],
        )?;
        Ok(new_slug)
    }

    async fn list_rooms_for(&self, identity: &Identity) -> WikiResult<Vec<Room>> {
        let conn = self.get_connection()?;
        let all_rooms = identity.is_superuser || {
            conn.query_row(
                "SELECT 1 FROM memberships WHERE user_id = ?1 AND room_name = ?2",
                params![identity.user_id, ALL_ROOMS],
                |_| Ok(()),
            )
            .optional()?
            .is_some()
        };

        let sql = if all_rooms {
            format!("SELECT {} FROM rooms ORDER BY name", ROOM_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM rooms
                 WHERE name IN (SELECT room_name FROM memberships WHERE user_id = ?1)
                 ORDER BY name",
                ROOM_COLUMNS
            )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = if all_rooms {
            stmt.query_map([], room_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![identity.user_id], room_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        rows.into_iter().map(build_room).collect()
    }

    async fn room_by_public_slug(&self, slug: &str) -> WikiResult<Room> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM rooms WHERE public_slug = ?1", ROOM_COLUMNS),
                params![slug],
                room_from_row,
            )
            .optional()?
            .ok_or_else(|| WikiError::not_found("room", slug))?;
        build_room(row)
    }

    // ---- memberships ----

    async fn membership_role(&self, user_id: i64, room: &RoomId) -> WikiResult<Option<Role>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT role FROM memberships WHERE user_id = ?1 AND room_name IN (?2, ?3)",
        )?;
        let roles = stmt
            .query_map(params![user_id, room.as_str(), ALL_ROOMS], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut best: Option<Role> = None;
        for raw in roles {
            let role: Role = raw.parse()?;
            if best.is_none_or(|b| role.level() > b.level()) {
                best = Some(role);
            }
        }
        Ok(best)
    }

    async fn list_memberships(&self, room: &RoomId) -> WikiResult<Vec<Membership>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT m.user_id, u.username, m.room_name, m.role
             FROM memberships m JOIN users u ON u.id = m.user_id
             WHERE m.room_name = ?1 ORDER BY u.username",
        )?;
        let rows = stmt
            .query_map(params![room.as_str()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(user_id, username, room, role)| {
                Ok(Membership {
                    user_id,
                    username,
                    room,
                    role: role.parse()?,
                })
            })
            .collect()
    }

    async fn replace_user_rooms(
        &self,
        user_id: i64,
        rooms: &[(RoomId, Role)],
    ) -> WikiResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM memberships WHERE user_id = ?1", params![user_id])?;
        for (room, role) in rooms {
            tx.execute(
                "INSERT INTO memberships (user_id, room_name, role) VALUES (?1, ?2, ?3)",
                params![user_id, room.as_str(), role.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ---- pages ----

    async fn create_page(
        &self,
        ctx: &NamespaceContext,
        author: &Identity,
        page: NewPage,
    ) -> WikiResult<Page> {
        let parent = match page.parent_path.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => Some(p.parse::<PagePath>()?),
            None => None,
        };
        let path = PagePath::compose(parent.as_ref(), &page.slug)?;
        // The stored slug is the sanitized path leaf, keeping slug and path
        // in lockstep.
        let slug = path.leaf().to_string();
        let content = serde_json::to_string(&page.content)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.get_connection()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (title, slug, content, path, created_at, created_by, updated_at, updated_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?5, ?6)",
                pages_table(ctx)
            ),
            params![page.title, slug, content, path.as_str(), now, author.username],
        )
        .map_err(|e| {
            remap_conflict(e, &format!("page slug or path already exists: {}", path))
        })?;

        let id = conn.last_insert_rowid();
        tracing::debug!(room = ctx.room().as_str(), page = id, path = path.as_str(), "created page");
        self.load_page(&conn, ctx, id)
    }

    async fn get_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<Page> {
        let conn = self.get_connection()?;
        self.load_page(&conn, ctx, id)
    }

    async fn get_page_by_slug(&self, ctx: &NamespaceContext, slug: &str) -> WikiResult<Page> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE slug = ?1",
                    PAGE_COLUMNS,
                    pages_table(ctx)
                ),
                params![slug],
                read_page_row,
            )
            .optional()?
            .ok_or_else(|| WikiError::not_found("page", slug))?;
        build_page(row)
    }

    async fn update_page(
        &self,
        ctx: &NamespaceContext,
        editor: &Identity,
        id: i64,
        update: PageUpdate,
    ) -> WikiResult<Page> {
        let pages = pages_table(ctx);
        let versions = versions_table(ctx);
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = {
            let row = tx
                .query_row(
                    &format!("SELECT {} FROM {} WHERE id = ?1", PAGE_COLUMNS, pages),
                    params![id],
                    read_page_row,
                )
                .optional()?
                .ok_or_else(|| WikiError::not_found("page", id.to_string()))?;
            build_page(row)?
        };

        // Work out the target path from the effective slug and parent.
        let new_slug = match update.slug.as_deref() {
            Some(s) => crate::path::sanitize_slug(s)?,
            None => current.slug.clone(),
        };
        let new_parent = match &update.parent_path {
            None => current.path.parent(),
            Some(None) => None,
            Some(Some(p)) if p.is_empty() => None,
            Some(Some(p)) => Some(p.parse::<PagePath>()?),
        };
        let new_path = PagePath::compose(new_parent.as_ref(), &new_slug)?;

        if new_path != current.path {
            if new_path.is_descendant_of(&current.path) {
                return Err(WikiError::validation(format!(
                    "cannot move page {} under itself",
                    current.path
                )));
            }
            let occupied = tx
                .query_row(
                    &format!("SELECT 1 FROM {} WHERE path = ?1 AND id <> ?2", pages),
                    params![new_path.as_str(), id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if occupied {
                return Err(WikiError::conflict(format!(
                    "path {} is already taken",
                    new_path
                )));
            }

            tx.execute(
                &format!("UPDATE {} SET slug = ?1, path = ?2 WHERE id = ?3", pages),
                params![new_path.leaf(), new_path.as_str(), id],
            )
            .map_err(|e| remap_conflict(e, &format!("path {} is already taken", new_path)))?;

            // Relocate all strict descendants in one predicate-scoped
            // update; the page's own row was rewritten above and is
            // excluded here.
            let moved = tx.execute(
                &format!(
                    "UPDATE {} SET path = ?1 || substr(path, length(?2) + 1)
                     WHERE substr(path, 1, length(?2) + 1) = ?2 || '.' AND id <> ?3",
                    pages
                ),
                params![new_path.as_str(), current.path.as_str(), id],
            )?;
            tracing::debug!(
                room = ctx.room().as_str(),
                page = id,
                from = current.path.as_str(),
                to = new_path.as_str(),
                descendants = moved,
                "relocated subtree"
            );
        }

        let title_changed = update.title.as_ref().is_some_and(|t| *t != current.title);
        let content_changed = update
            .content
            .as_ref()
            .is_some_and(|c| *c != current.content);
        if title_changed || content_changed {
            // Snapshot the pre-update state before touching the live row.
            tx.execute(
                &format!(
                    "INSERT INTO {} (page_id, title, content, edited_by, edited_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    versions
                ),
                params![
                    id,
                    current.title,
                    serde_json::to_string(&current.content)?,
                    current.updated_by,
                    current.updated_at.to_rfc3339()
                ],
            )?;

            let title = update.title.as_deref().unwrap_or(&current.title);
            let content = match &update.content {
                Some(c) => serde_json::to_string(c)?,
                None => serde_json::to_string(&current.content)?,
            };
            tx.execute(
                &format!("UPDATE {} SET title = ?1, content = ?2 WHERE id = ?3", pages),
                params![title, content, id],
            )?;
        }

        tx.execute(
            &format!(
                "UPDATE {} SET updated_at = ?1, updated_by = ?2 WHERE id = ?3",
                pages
            ),
            params![Utc::now().to_rfc3339(), editor.username, id],
        )?;
        tx.commit()?;

        self.load_page(&conn, ctx, id)
    }

    async fn delete_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<()> {
        let pages = pages_table(ctx);
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let path: Option<String> = tx
            .query_row(
                &format!("SELECT path FROM {} WHERE id = ?1", pages),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let path = path.ok_or_else(|| WikiError::not_found("page", id.to_string()))?;

        let has_children = tx
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE substr(path, 1, length(?1) + 1) = ?1 || '.' LIMIT 1",
                    pages
                ),
                params![path],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if has_children {
            return Err(WikiError::conflict("page has child pages"));
        }

        // Versions are retained as historical record.
        tx.execute(&format!("DELETE FROM {} WHERE id = ?1", pages), params![id])?;
        tx.commit()?;
        Ok(())
    }

    async fn list_pages(&self, ctx: &NamespaceContext) -> WikiResult<Vec<Page>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY path",
            PAGE_COLUMNS,
            pages_table(ctx)
        ))?;
        let rows = stmt
            .query_map([], read_page_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(build_page).collect()
    }

    async fn list_versions(
        &self,
        ctx: &NamespaceContext,
        page_id: i64,
    ) -> WikiResult<Vec<PageVersion>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, page_id, title, content, edited_by, edited_at
             FROM {} WHERE page_id = ?1 ORDER BY id DESC LIMIT {}",
            versions_table(ctx),
            VERSION_LIST_LIMIT
        ))?;
        let rows = stmt
            .query_map(params![page_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, page_id, title, content, edited_by, edited_at)| {
                Ok(PageVersion {
                    id,
                    page_id,
                    title,
                    content: serde_json::from_str(&content)?,
                    edited_by,
                    edited_at: parse_ts(&edited_at)?,
                })
            })
            .collect()
    }

    // ---- search ----

    async fn search_pages(
        &self,
        ctx: &NamespaceContext,
        query: &str,
    ) -> WikiResult<Vec<SearchHit>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.get_connection()?;
        // Over-fetching is fine: ranking re-checks containment precisely.
        // SQLite's lower() folds ASCII only, so non-ASCII queries skip the
        // SQL prefilter and let ranking do the Unicode comparison.
        let rows = if needle.is_ascii() {
            let pattern = format!("%{}%", needle);
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {} WHERE lower(title) LIKE ?1 OR lower(content) LIKE ?1",
                PAGE_COLUMNS,
                pages_table(ctx)
            ))?;
            stmt.query_map(params![pattern], read_page_row)?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM {}",
                PAGE_COLUMNS,
                pages_table(ctx)
            ))?;
            stmt.query_map([], read_page_row)?
                .collect::<Result<Vec<_>, _>>()?
        };
        let candidates = rows
            .into_iter()
            .map(build_page)
            .collect::<WikiResult<Vec<_>>>()?;
        Ok(search::rank_pages(query.trim(), &candidates))
    }

    // ---- shared links ----

    async fn create_shared_link(
        &self,
        ctx: &NamespaceContext,
        page_id: i64,
        expires_in_days: Option<i64>,
    ) -> WikiResult<SharedLink> {
        let conn = self.get_connection()?;
        // The page must exist in this namespace before a link is issued.
        self.load_page(&conn, ctx, page_id)?;

        let token = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = expires_in_days.map(|days| created_at + chrono::Duration::days(days));
        conn.execute(
            "INSERT INTO shared_links (token, room_name, page_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                token,
                ctx.room().as_str(),
                page_id,
                created_at.to_rfc3339(),
                expires_at.map(|t| t.to_rfc3339())
            ],
        )?;
        Ok(SharedLink {
            token,
            room: ctx.room().clone(),
            page_id,
            created_at,
            expires_at,
        })
    }

    async fn resolve_shared_link(&self, token: &str) -> WikiResult<(SharedLink, Page)> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT token, room_name, page_id, created_at, expires_at
                 FROM shared_links WHERE token = ?1",
                params![token],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?
            .ok_or_else(|| WikiError::not_found("shared link", token))?;

        let (token, room_name, page_id, created_at, expires_at) = row;
        let expires_at = expires_at.as_deref().map(parse_ts).transpose()?;
        if let Some(expiry) = expires_at {
            if expiry < Utc::now() {
                return Err(WikiError::Gone {
                    message: format!("shared link expired at {}", expiry.to_rfc3339()),
                });
            }
        }

        let room = RoomId::new(room_name)?;
        let ctx = NamespaceContext::resolve(room.clone());
        let page = self.load_page(&conn, &ctx, page_id)?;
        Ok((
            SharedLink {
                token,
                room,
                page_id,
                created_at: parse_ts(&created_at)?,
                expires_at,
            },
            page,
        ))
    }

    // ---- feedback ----

    async fn add_feedback(
        &self,
        room_name: &str,
        message: &str,
        author_name: Option<&str>,
        author_org: Option<&str>,
    ) -> WikiResult<Feedback> {
        if message.trim().is_empty() {
            return Err(WikiError::validation("feedback message must not be empty"));
        }
        let conn = self.get_connection()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO feedback (room_name, message, author_name, author_org, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![room_name, message, author_name, author_org, created_at.to_rfc3339()],
        )?;
        Ok(Feedback {
            id: conn.last_insert_rowid(),
            room_name: room_name.to_string(),
            message: message.to_string(),
            author_name: author_name.map(str::to_string),
            author_org: author_org.map(str::to_string),
            created_at,
        })
    }

    async fn list_feedback(&self, room_name: &str) -> WikiResult<Vec<Feedback>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, room_name, message, author_name, author_org, created_at
             FROM feedback WHERE room_name = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt
            .query_map(params![room_name], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, room_name, message, author_name, author_org, created_at)| {
                Ok(Feedback {
                    id,
                    room_name,
                    message,
                    author_name,
                    author_org,
                    created_at: parse_ts(&created_at)?,
                })
            })
            .collect()
    }

    async fn feedback_count(&self, room_name: &str) -> WikiResult<i64> {
        let conn = self.get_connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM feedback WHERE room_name = ?1",
            params![room_name],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
