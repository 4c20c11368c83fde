//! Room (tenant) identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WikiError;

/// The shared/default room, open to all authenticated users.
///
/// Entities under the shared room live in the shared namespace directly;
/// resolving it never provisions per-tenant structures.
pub const PUBLIC_ROOM: &str = "public";

/// Sentinel room name granting membership in every room.
pub const ALL_ROOMS: &str = "__all__";

/// Maximum accepted identifier length.
const MAX_LEN: usize = 64;

/// A validated room identifier.
///
/// Room identifiers are restricted to `[A-Za-z0-9_]+` because they are
/// interpolated into namespace-qualifying operations (schema and table
/// names). Construction is the single point where untrusted input crosses
/// that boundary; a `RoomId` in hand is always safe to interpolate.
///
/// # Examples
///
/// ```
/// use roomwiki_persistence::tenant::RoomId;
///
/// let room: RoomId = "acme".parse().unwrap();
/// assert_eq!(room.as_str(), "acme");
/// assert!("bad;name".parse::<RoomId>().is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Validates and wraps a room identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, WikiError> {
        let id = id.into();
        if !is_valid_room_id(&id) {
            return Err(WikiError::InvalidTenant { tenant: id });
        }
        Ok(RoomId(id))
    }

    /// Returns the shared/default room.
    pub fn public() -> Self {
        RoomId(PUBLIC_ROOM.to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the shared/default room.
    pub fn is_public(&self) -> bool {
        self.0 == PUBLIC_ROOM
    }
}

/// Charset check for room identifiers: `[A-Za-z0-9_]+`, bounded length.
pub fn is_valid_room_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomId({})", self.0)
    }
}

impl FromStr for RoomId {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomId::new(s)
    }
}

impl TryFrom<String> for RoomId {
    type Error = WikiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RoomId::new(value)
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> String {
        id.0
    }
}

impl AsRef<str> for RoomId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ids() {
        assert!(RoomId::new("acme").is_ok());
        assert!(RoomId::new("Acme_2024").is_ok());
        assert!(RoomId::new("__all__").is_ok());
    }

    #[test]
    fn test_invalid_ids_rejected() {
        for bad in ["", "a-b", "a.b", "a b", "a;DROP TABLE pages", "a\"b", "日本"] {
            assert!(RoomId::new(bad).is_err(), "accepted: {:?}", bad);
        }
        assert!(RoomId::new("x".repeat(65)).is_err());
    }

    #[test]
    fn test_invalid_id_error_variant() {
        let err = RoomId::new("a-b").unwrap_err();
        assert!(matches!(err, WikiError::InvalidTenant { .. }));
    }

    #[test]
    fn test_public_room() {
        assert!(RoomId::public().is_public());
        let parsed: RoomId = "public".parse().unwrap();
        assert!(parsed.is_public());
        assert!(!"acme".parse::<RoomId>().unwrap().is_public());
    }

    #[test]
    fn test_serde_round_trip() {
        let room: RoomId = "acme".parse().unwrap();
        let json = serde_json::to_string(&room).unwrap();
        assert_eq!(json, "\"acme\"");
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, room);
        assert!(serde_json::from_str::<RoomId>("\"a;b\"").is_err());
    }
}
