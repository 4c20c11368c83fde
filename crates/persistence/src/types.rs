//! Core domain records shared across backends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::Role;
use crate::path::PagePath;
use crate::tenant::RoomId;

/// A registered user in the shared namespace.
///
/// Credential verification happens outside this layer; the opaque API token
/// is only ever matched, never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
    /// Opaque bearer token. Excluded from serialized output.
    #[serde(skip_serializing, default)]
    pub token: Option<String>,
}

/// A resolved request identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            user_id: user.id,
            username: user.username.clone(),
            is_superuser: user.is_superuser,
        }
    }
}

/// A wiki room (tenant) in the shared directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub name: RoomId,
    pub display_name: String,
    /// Opaque public-sharing slug; `None` while sharing is off.
    pub public_slug: Option<String>,
    pub logo_url: Option<String>,
    pub welcome_page_id: Option<i64>,
    pub public_title: Option<String>,
    pub public_subtitle: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Mutable room settings, applied partially.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub display_name: Option<String>,
    pub logo_url: Option<Option<String>>,
    pub welcome_page_id: Option<Option<i64>>,
    pub public_title: Option<Option<String>>,
    pub public_subtitle: Option<Option<String>>,
}

/// A (user, room, role) membership grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: i64,
    pub username: String,
    pub room: String,
    pub role: Role,
}

/// A wiki page inside one room namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// Opaque serialized document.
    pub content: Value,
    pub path: PagePath,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
}

/// Input for page creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: Value,
    /// Parent path, empty or absent for a root page.
    #[serde(default)]
    pub parent_path: Option<String>,
}

/// Partial page update. Slug and parent-path changes trigger subtree
/// relocation; title/content changes snapshot a version first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub content: Option<Value>,
    pub slug: Option<String>,
    pub parent_path: Option<Option<String>>,
}

/// Immutable pre-update snapshot of a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVersion {
    pub id: i64,
    pub page_id: i64,
    pub title: String,
    pub content: Value,
    pub edited_by: String,
    pub edited_at: DateTime<Utc>,
}

/// A per-page shared access link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedLink {
    pub token: String,
    pub room: RoomId,
    pub page_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Free-text feedback, weakly tied to a room by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub room_name: String,
    pub message: String,
    pub author_name: Option<String>,
    pub author_org: Option<String>,
    pub created_at: DateTime<Utc>,
}
