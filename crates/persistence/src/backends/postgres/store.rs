//! WikiStore implementation for PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Transaction;
use tokio_postgres::Row;

use crate::access::Role;
use crate::error::{WikiError, WikiResult};
use crate::path::PagePath;
use crate::search::{self, SearchHit};
use crate::store::{VERSION_LIST_LIMIT, WikiStore};
use crate::tenant::{ALL_ROOMS, NamespaceContext, RoomId, namespace};
use crate::types::{
    Feedback, Identity, Membership, NewPage, Page, PageUpdate, PageVersion, Room, RoomUpdate,
    SharedLink, User,
};

use super::PostgresBackend;
use super::backend::page_tables_sql;

const PAGE_COLUMNS: &str =
    "id, title, slug, content, path, created_at, created_by, updated_at, updated_by";

const ROOM_COLUMNS: &str =
    "name, display_name, public_slug, logo_url, welcome_page_id, public_title, public_subtitle, created_at";

fn page_from_row(row: &Row) -> WikiResult<Page> {
    let content: String = row.get(3);
    let path: String = row.get(4);
    Ok(Page {
        id: row.get(0),
        title: row.get(1),
        slug: row.get(2),
        content: serde_json::from_str(&content)?,
        path: path.parse()?,
        created_at: row.get(5),
        created_by: row.get(6),
        updated_at: row.get(7),
        updated_by: row.get(8),
    })
}

fn room_from_row(row: &Row) -> WikiResult<Room> {
    let name: String = row.get(0);
    Ok(Room {
        name: RoomId::new(name)?,
        display_name: row.get(1),
        public_slug: row.get(2),
        logo_url: row.get(3),
        welcome_page_id: row.get(4),
        public_title: row.get(5),
        public_subtitle: row.get(6),
        created_at: row.get(7),
    })
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get(0),
        username: row.get(1),
        is_superuser: row.get(2),
        token: None,
    }
}

/// Remaps a unique-violation to a caller-facing conflict message.
fn remap_conflict(err: tokio_postgres::Error, message: &str) -> WikiError {
    match WikiError::from(err) {
        WikiError::Conflict { .. } => WikiError::conflict(message),
        other => other,
    }
}

impl PostgresBackend {
    /// Begins a transaction scoped to the context's namespace. `SET LOCAL`
    /// keeps the search path bound to this transaction only.
    async fn begin<'a>(
        &self,
        client: &'a mut deadpool_postgres::Object,
        ctx: &NamespaceContext,
    ) -> WikiResult<Transaction<'a>> {
        let tx = client.transaction().await?;
        if let Some(ns) = ctx.namespace() {
            tx.batch_execute(&namespace::set_search_path_sql(ns)).await?;
        }
        Ok(tx)
    }

    async fn load_page_tx(&self, tx: &Transaction<'_>, id: i64) -> WikiResult<Page> {
        let row = tx
            .query_opt(
                &format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS),
                &[&id],
            )
            .await?
            .ok_or_else(|| WikiError::not_found("page", id.to_string()))?;
        page_from_row(&row)
    }

    async fn load_room(&self, name: &RoomId) -> WikiResult<Room> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                &format!("SELECT {} FROM public.rooms WHERE name = $1", ROOM_COLUMNS),
                &[&name.as_str()],
            )
            .await?
            .ok_or_else(|| WikiError::not_found("room", name.as_str()))?;
        room_from_row(&row)
    }
}

#[async_trait]
impl WikiStore for PostgresBackend {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_namespace(&self, ctx: &NamespaceContext) -> WikiResult<()> {
        let Some(ns) = ctx.namespace() else {
            return Ok(());
        };
        let client = self.client().await?;
        client
            .batch_execute(&namespace::create_schema_sql(ns))
            .await?;
        client
            .batch_execute(&page_tables_sql(&namespace::escape_identifier(ns)))
            .await?;
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
        let client = self.client().await?;
        let row = client
            .query_one(
                "INSERT INTO public.users (username, token, is_superuser)
                 VALUES ($1, $2, $3) RETURNING id",
                &[&username, &token, &is_superuser],
            )
            .await
            .map_err(|e| remap_conflict(e, &format!("username {} already taken", username)))?;
        Ok(User {
            id: row.get(0),
            username: username.to_string(),
            is_superuser,
            token: Some(token.to_string()),
        })
    }

    async fn list_users(&self) -> WikiResult<Vec<User>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, username, is_superuser FROM public.users ORDER BY username",
                &[],
            )
            .await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn delete_user(&self, user_id: i64) -> WikiResult<()> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        tx.execute(
            "DELETE FROM public.memberships WHERE user_id = $1",
            &[&user_id],
        )
        .await?;
        let deleted = tx
            .execute("DELETE FROM public.users WHERE id = $1", &[&user_id])
            .await?;
        if deleted == 0 {
            return Err(WikiError::not_found("user", user_id.to_string()));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn user_by_token(&self, token: &str) -> WikiResult<Option<User>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT id, username, is_superuser FROM public.users WHERE token = $1",
                &[&token],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
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
        let mut client = self.client().await?;
        let tx = client.transaction().await?;

        // Room names differing only in letter case would collapse into one
        // namespace; refuse them before any row is written.
        let clash = tx
            .query_opt(
                "SELECT name FROM public.rooms WHERE lower(name) = lower($1)",
                &[&name.as_str()],
            )
            .await?;
        if let Some(row) = clash {
            let existing: String = row.get(0);
            return Err(WikiError::conflict(format!(
                "room {} already exists as {}",
                name, existing
            )));
        }

        tx.execute(
            "INSERT INTO public.rooms (name, display_name, created_at) VALUES ($1, $2, $3)",
            &[&name.as_str(), &display_name, &Utc::now()],
        )
        .await
        .map_err(|e| remap_conflict(e, &format!("room {} already exists", name)))?;

        tx.execute(
            "INSERT INTO public.memberships (user_id, room_name, role) VALUES ($1, $2, $3)",
            &[&creator.user_id, &name.as_str(), &Role::Owner.as_str()],
        )
        .await?;

        if let Some(ns) = ctx.namespace() {
            tx.batch_execute(&namespace::create_schema_sql(ns)).await?;
            tx.batch_execute(&page_tables_sql(&namespace::escape_identifier(ns)))
                .await?;
        }
        tx.commit().await?;

        tracing::info!(room = name.as_str(), creator = %creator.username, "created room");
        self.load_room(name).await
    }

    async fn get_room(&self, name: &RoomId) -> WikiResult<Room> {
        self.load_room(name).await
    }

    async fn update_room(&self, name: &RoomId, update: RoomUpdate) -> WikiResult<Room> {
        let mut room = self.load_room(name).await?;

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

        let client = self.client().await?;
        client
            .execute(
                "UPDATE public.rooms SET display_name = $1, logo_url = $2,
                 welcome_page_id = $3, public_title = $4, public_subtitle = $5
                 WHERE name = $6",
                &[
                    &room.display_name,
                    &room.logo_url,
                    &room.welcome_page_id,
                    &room.public_title,
                    &room.public_subtitle,
                    &name.as_str(),
                ],
            )
            .await?;
        Ok(room)
    }

    async fn delete_room(&self, name: &RoomId) -> WikiResult<()> {
        let ctx = NamespaceContext::resolve(name.clone());
        let mut client = self.client().await?;
        let tx = client.transaction().await?;

        let deleted = tx
            .execute("DELETE FROM public.rooms WHERE name = $1", &[&name.as_str()])
            .await?;
        if deleted == 0 {
            return Err(WikiError::not_found("room", name.as_str()));
        }
        tx.execute(
            "DELETE FROM public.memberships WHERE room_name = $1",
            &[&name.as_str()],
        )
        .await?;
        tx.execute(
            "DELETE FROM public.shared_links WHERE room_name = $1",
            &[&name.as_str()],
        )
        .await?;
        if let Some(ns) = ctx.namespace() {
            tx.batch_execute(&namespace::drop_schema_sql(ns)).await?;
        }
        tx.commit().await?;

        tracing::info!(room = name.as_str(), "deleted room and namespace");
        Ok(())
    }

    async fn toggle_public(&self, name: &RoomId) -> WikiResult<Option<String>> {
        let room = self.load_room(name).await?;
        let new_slug = match room.public_slug {
            // Turning off: the old slug is gone for good.
            Some(_) => None,
            None => Some(uuid::Uuid::new_v4().simple().to_string()[..8].to_string()),
        };
        let client = self.client().await?;
        client
            .execute(
                "UPDATE public.rooms SET public_slug = $1 WHERE name = $2",
                &[&new_slug, &name.as_str()],
            )
            .await?;
        Ok(new_slug)
    }

    async fn list_rooms_for(&self, identity: &Identity) -> WikiResult<Vec<Room>> {
        let client = self.client().await?;
        let all_rooms = identity.is_superuser
            || client
                .query_opt(
                    "SELECT 1 FROM public.memberships WHERE user_id = $1 AND room_name = $2",
                    &[&identity.user_id, &ALL_ROOMS],
                )
                .await?
                .is_some();

        let rows = if all_rooms {
            client
                .query(
                    &format!("SELECT {} FROM public.rooms ORDER BY name", ROOM_COLUMNS),
                    &[],
                )
                .await?
        } else {
            client
                .query(
                    &format!(
                        "SELECT {} FROM public.rooms
                         WHERE name IN (SELECT room_name FROM public.memberships WHERE user_id = $1)
                         ORDER BY name",
                        ROOM_COLUMNS
                    ),
                    &[&identity.user_id],
                )
                .await?
        };
        rows.iter().map(room_from_row).collect()
    }

    async fn room_by_public_slug(&self, slug: &str) -> WikiResult<Room> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                &format!(
                    "SELECT {} FROM public.rooms WHERE public_slug = $1",
                    ROOM_COLUMNS
                ),
                &[&slug],
            )
            .await?
            .ok_or_else(|| WikiError::not_found("room", slug))?;
        room_from_row(&row)
    }

    // ---- memberships ----

    async fn membership_role(&self, user_id: i64, room: &RoomId) -> WikiResult<Option<Role>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT role FROM public.memberships
                 WHERE user_id = $1 AND room_name IN ($2, $3)",
                &[&user_id, &room.as_str(), &ALL_ROOMS],
            )
            .await?;
        let mut best: Option<Role> = None;
        for row in rows {
            let role: Role = row.get::<_, String>(0).parse()?;
            if best.is_none_or(|b| role.level() > b.level()) {
                best = Some(role);
            }
        }
        Ok(best)
    }

    async fn list_memberships(&self, room: &RoomId) -> WikiResult<Vec<Membership>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT m.user_id, u.username, m.room_name, m.role
                 FROM public.memberships m JOIN public.users u ON u.id = m.user_id
                 WHERE m.room_name = $1 ORDER BY u.username",
                &[&room.as_str()],
            )
            .await?;
        rows.into_iter()
            .map(|row| {
                Ok(Membership {
                    user_id: row.get(0),
                    username: row.get(1),
                    room: row.get(2),
                    role: row.get::<_, String>(3).parse()?,
                })
            })
            .collect()
    }

    async fn replace_user_rooms(&self, user_id: i64, rooms: &[(RoomId, Role)]) -> WikiResult<()> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        tx.execute(
            "DELETE FROM public.memberships WHERE user_id = $1",
            &[&user_id],
        )
        .await?;
        for (room, role) in rooms {
            tx.execute(
                "INSERT INTO public.memberships (user_id, room_name, role) VALUES ($1, $2, $3)",
                &[&user_id, &room.as_str(), &role.as_str()],
            )
            .await?;
        }
        tx.commit().await?;
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
        let slug = path.leaf().to_string();
        let content = serde_json::to_string(&page.content)?;
        let now = Utc::now();

        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        let row = tx
            .query_one(
                &format!(
                    "INSERT INTO pages (title, slug, content, path, created_at, created_by, updated_at, updated_by)
                     VALUES ($1, $2, $3, $4, $5, $6, $5, $6)
                     RETURNING {}",
                    PAGE_COLUMNS
                ),
                &[&page.title, &slug, &content, &path.as_str(), &now, &author.username],
            )
            .await
            .map_err(|e| remap_conflict(e, &format!("page slug or path already exists: {}", path)))?;
        tx.commit().await?;
        page_from_row(&row)
    }

    async fn get_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<Page> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        let page = self.load_page_tx(&tx, id).await?;
        tx.commit().await?;
        Ok(page)
    }

    async fn get_page_by_slug(&self, ctx: &NamespaceContext, slug: &str) -> WikiResult<Page> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        let row = tx
            .query_opt(
                &format!("SELECT {} FROM pages WHERE slug = $1", PAGE_COLUMNS),
                &[&slug],
            )
            .await?
            .ok_or_else(|| WikiError::not_found("page", slug))?;
        tx.commit().await?;
        page_from_row(&row)
    }

    async fn update_page(
        &self,
        ctx: &NamespaceContext,
        editor: &Identity,
        id: i64,
        update: PageUpdate,
    ) -> WikiResult<Page> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;

        let current = self.load_page_tx(&tx, id).await?;

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
                .query_opt(
                    "SELECT 1 FROM pages WHERE path = $1 AND id <> $2",
                    &[&new_path.as_str(), &id],
                )
                .await?
                .is_some();
            if occupied {
                return Err(WikiError::conflict(format!(
                    "path {} is already taken",
                    new_path
                )));
            }

            tx.execute(
                "UPDATE pages SET slug = $1, path = $2 WHERE id = $3",
                &[&new_path.leaf(), &new_path.as_str(), &id],
            )
            .await
            .map_err(|e| remap_conflict(e, &format!("path {} is already taken", new_path)))?;

            // Single predicate-scoped relocation of all strict descendants;
            // the page's own row was rewritten above and is excluded here.
            let moved = tx
                .execute(
                    "UPDATE pages
                     SET path = $1 || substring(path FROM char_length($2) + 1)
                     WHERE left(path, char_length($2) + 1) = $2 || '.' AND id <> $3",
                    &[&new_path.as_str(), &current.path.as_str(), &id],
                )
                .await?;
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
                "INSERT INTO page_versions (page_id, title, content, edited_by, edited_at)
                 VALUES ($1, $2, $3, $4, $5)",
                &[
                    &id,
                    &current.title,
                    &serde_json::to_string(&current.content)?,
                    &current.updated_by,
                    &current.updated_at,
                ],
            )
            .await?;

            let title = update.title.as_deref().unwrap_or(&current.title);
            let content = match &update.content {
                Some(c) => serde_json::to_string(c)?,
                None => serde_json::to_string(&current.content)?,
            };
            tx.execute(
                "UPDATE pages SET title = $1, content = $2 WHERE id = $3",
                &[&title, &content, &id],
            )
            .await?;
        }

        tx.execute(
            "UPDATE pages SET updated_at = $1, updated_by = $2 WHERE id = $3",
            &[&Utc::now(), &editor.username, &id],
        )
        .await?;
        let page = self.load_page_tx(&tx, id).await?;
        tx.commit().await?;
        Ok(page)
    }

    async fn delete_page(&self, ctx: &NamespaceContext, id: i64) -> WikiResult<()> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;

        let row = tx
            .query_opt("SELECT path FROM pages WHERE id = $1", &[&id])
            .await?
            .ok_or_else(|| WikiError::not_found("page", id.to_string()))?;
        let path: String = row.get(0);

        let has_children = tx
            .query_opt(
                "SELECT 1 FROM pages
                 WHERE left(path, char_length($1) + 1) = $1 || '.' LIMIT 1",
                &[&path],
            )
            .await?
            .is_some();
        if has_children {
            return Err(WikiError::conflict("page has child pages"));
        }

        // Versions are retained as historical record.
        tx.execute("DELETE FROM pages WHERE id = $1", &[&id]).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_pages(&self, ctx: &NamespaceContext) -> WikiResult<Vec<Page>> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        let rows = tx
            .query(
                &format!("SELECT {} FROM pages ORDER BY path", PAGE_COLUMNS),
                &[],
            )
            .await?;
        tx.commit().await?;
        rows.iter().map(page_from_row).collect()
    }

    async fn list_versions(
        &self,
        ctx: &NamespaceContext,
        page_id: i64,
    ) -> WikiResult<Vec<PageVersion>> {
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        let rows = tx
            .query(
                &format!(
                    "SELECT id, page_id, title, content, edited_by, edited_at
                     FROM page_versions WHERE page_id = $1
                     ORDER BY id DESC LIMIT {}",
                    VERSION_LIST_LIMIT
                ),
                &[&page_id],
            )
            .await?;
        tx.commit().await?;
        rows.into_iter()
            .map(|row| {
                let content: String = row.get(3);
                Ok(PageVersion {
                    id: row.get(0),
                    page_id: row.get(1),
                    title: row.get(2),
                    content: serde_json::from_str(&content)?,
                    edited_by: row.get(4),
                    edited_at: row.get(5),
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
        let pattern = format!("%{}%", needle);
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        // Over-fetching is fine: ranking re-checks containment precisely.
        let rows = tx
            .query(
                &format!(
                    "SELECT {} FROM pages
                     WHERE lower(title) LIKE $1 OR lower(content) LIKE $1",
                    PAGE_COLUMNS
                ),
                &[&pattern],
            )
            .await?;
        tx.commit().await?;
        let candidates = rows
            .iter()
            .map(page_from_row)
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
        let mut client = self.client().await?;
        let tx = self.begin(&mut client, ctx).await?;
        // The page must exist in this namespace before a link is issued.
        self.load_page_tx(&tx, page_id).await?;

        let token = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = expires_in_days.map(|days| created_at + chrono::Duration::days(days));
        tx.execute(
            "INSERT INTO public.shared_links (token, room_name, page_id, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5)",
            &[&token, &ctx.room().as_str(), &page_id, &created_at, &expires_at],
        )
        .await?;
        tx.commit().await?;
        Ok(SharedLink {
            token,
            room: ctx.room().clone(),
            page_id,
            created_at,
            expires_at,
        })
    }

    async fn resolve_shared_link(&self, token: &str) -> WikiResult<(SharedLink, Page)> {
        let mut client = self.client().await?;
        let row = client
            .query_opt(
                "SELECT token, room_name, page_id, created_at, expires_at
                 FROM public.shared_links WHERE token = $1",
                &[&token],
            )
            .await?
            .ok_or_else(|| WikiError::not_found("shared link", token))?;

        let room_name: String = row.get(1);
        let page_id: i64 = row.get(2);
        let created_at: DateTime<Utc> = row.get(3);
        let expires_at: Option<DateTime<Utc>> = row.get(4);
        if let Some(expiry) = expires_at {
            if expiry < Utc::now() {
                return Err(WikiError::Gone {
                    message: format!("shared link expired at {}", expiry.to_rfc3339()),
                });
            }
        }

        let room = RoomId::new(room_name)?;
        let ctx = NamespaceContext::resolve(room.clone());
        let tx = self.begin(&mut client, &ctx).await?;
        let page = self.load_page_tx(&tx, page_id).await?;
        tx.commit().await?;
        Ok((
            SharedLink {
                token: token.to_string(),
                room,
                page_id,
                created_at,
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
        let client = self.client().await?;
        let created_at = Utc::now();
        let row = client
            .query_one(
                "INSERT INTO public.feedback (room_name, message, author_name, author_org, created_at)
                 VALUES ($1, $2, $3, $4, $5) RETURNING id",
                &[&room_name, &message, &author_name, &author_org, &created_at],
            )
            .await?;
        Ok(Feedback {
            id: row.get(0),
            room_name: room_name.to_string(),
            message: message.to_string(),
            author_name: author_name.map(str::to_string),
            author_org: author_org.map(str::to_string),
            created_at,
        })
    }

    async fn list_feedback(&self, room_name: &str) -> WikiResult<Vec<Feedback>> {
        let client = self.client().await?;
        let rows = client
            .query(
                "SELECT id, room_name, message, author_name, author_org, created_at
                 FROM public.feedback WHERE room_name = $1 ORDER BY id DESC",
                &[&room_name],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Feedback {
                id: row.get(0),
                room_name: row.get(1),
                message: row.get(2),
                author_name: row.get(3),
                author_org: row.get(4),
                created_at: row.get(5),
            })
            .collect())
    }

    async fn feedback_count(&self, room_name: &str) -> WikiResult<i64> {
        let client = self.client().await?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM public.feedback WHERE room_name = $1",
                &[&room_name],
            )
            .await?;
        Ok(row.get(0))
    }
}
