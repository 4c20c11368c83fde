//! Per-request namespace context.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::RoomId;
use super::namespace;

/// The resolved storage namespace for one request.
///
/// A context is created per request (or per store call in tests), carries
/// the room and its derived namespace name, and is passed explicitly to
/// every namespaced operation. It is never cached on shared state, so
/// namespace selection cannot leak across requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceContext {
    room: RoomId,
    namespace: Option<String>,
}

impl NamespaceContext {
    /// Resolves a room to its namespace context.
    ///
    /// The shared room maps to the shared namespace; any other (already
    /// validated) room maps to its own `tenant_*` namespace, consulted
    /// before the shared namespace so shared entities stay reachable.
    pub fn resolve(room: RoomId) -> Self {
        let namespace = if room.is_public() {
            None
        } else {
            Some(namespace::namespace_for(&room))
        };
        Self { room, namespace }
    }

    /// Context for the shared namespace.
    pub fn shared() -> Self {
        Self::resolve(RoomId::public())
    }

    /// The room this context was resolved from.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// True when this context targets the shared namespace.
    pub fn is_shared(&self) -> bool {
        self.namespace.is_none()
    }

    /// The tenant namespace name, or `None` for the shared namespace.
    ///
    /// The value is derived from a validated [`RoomId`] and is safe to
    /// interpolate into namespace-qualifying statements.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Debug for NamespaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceContext")
            .field("room", &self.room)
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tenant_room() {
        let ctx = NamespaceContext::resolve("Acme".parse().unwrap());
        assert!(!ctx.is_shared());
        assert_eq!(ctx.namespace(), Some("tenant_acme"));
        assert_eq!(ctx.room().as_str(), "Acme");
    }

    #[test]
    fn test_resolve_shared_room() {
        let ctx = NamespaceContext::shared();
        assert!(ctx.is_shared());
        assert_eq!(ctx.namespace(), None);
    }
}
