//! Role hierarchy and authorization checks.
//!
//! The role set is fixed, so authorization is a plain ordered comparison
//! rather than a rule engine. Two distinct gates exist: the general
//! minimum-role check, and a narrower Owner-or-superuser gate for
//! destructive room-level administration. The latter is deliberately not
//! derived from the hierarchy comparison.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{WikiError, WikiResult};
use crate::tenant::NamespaceContext;
use crate::types::Identity;

/// Ordered permission levels within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Viewer,
    Editor,
    Admin,
    Owner,
}

impl Role {
    /// Numeric level used for comparisons and messages.
    pub fn level(self) -> u8 {
        match self {
            Role::Viewer => 0,
            Role::Editor => 1,
            Role::Admin => 2,
            Role::Owner => 3,
        }
    }

    /// Canonical name, as stored and shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Viewer => "Viewer",
            Role::Editor => "Editor",
            Role::Admin => "Admin",
            Role::Owner => "Owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Viewer" => Ok(Role::Viewer),
            "Editor" => Ok(Role::Editor),
            "Admin" => Ok(Role::Admin),
            "Owner" => Ok(Role::Owner),
            other => Err(WikiError::validation(format!("unknown role: {}", other))),
        }
    }
}

/// Checks a minimum-role requirement against a resolved membership.
///
/// `membership` is the caller's role in the context's room, already looked
/// up (including the all-rooms sentinel), or `None` when no grant exists.
///
/// Order of evaluation: missing identity fails `Unauthenticated`; a
/// superuser always passes; the shared namespace is open to any
/// authenticated user; otherwise the membership level must meet the
/// minimum.
pub fn check_access(
    identity: Option<&Identity>,
    ctx: &NamespaceContext,
    membership: Option<Role>,
    minimum: Role,
) -> WikiResult<()> {
    let identity = identity.ok_or(WikiError::Unauthenticated)?;
    if identity.is_superuser {
        return Ok(());
    }
    if ctx.is_shared() {
        return Ok(());
    }
    match membership {
        None => Err(WikiError::forbidden(format!(
            "no access to room {}",
            ctx.room()
        ))),
        Some(role) if role.level() >= minimum.level() => Ok(()),
        Some(role) => Err(WikiError::forbidden(format!(
            "requires {}+ role, you have {}",
            minimum, role
        ))),
    }
}

/// Owner-or-superuser gate for destructive room administration (room
/// deletion, membership edits, public-link toggling).
///
/// Admin does not pass here regardless of hierarchy level.
pub fn check_owner(
    identity: Option<&Identity>,
    ctx: &NamespaceContext,
    membership: Option<Role>,
) -> WikiResult<()> {
    let identity = identity.ok_or(WikiError::Unauthenticated)?;
    if identity.is_superuser {
        return Ok(());
    }
    match membership {
        Some(Role::Owner) => Ok(()),
        _ => Err(WikiError::forbidden(format!(
            "requires Owner role in room {}",
            ctx.room()
        ))),
    }
}
