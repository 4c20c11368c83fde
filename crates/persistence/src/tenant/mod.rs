//! Tenant (room) resolution for multi-tenant wiki storage.
//!
//! Every namespaced storage operation takes a [`NamespaceContext`], making it
//! impossible to touch a room's pages without going through identifier
//! validation first. There is no escape hatch.
//!
//! # Core Types
//!
//! - [`RoomId`] - validated room identifier, the only way untrusted input
//!   enters namespace selection
//! - [`NamespaceContext`] - per-request resolved namespace
//!
//! # Isolation model
//!
//! One shared namespace holds the user directory, room directory,
//! memberships, shared links, and feedback. Each room gets its own
//! namespace holding that room's pages and page versions, structurally
//! mirroring the shared page schema. The shared room `"public"` maps
//! straight to the shared namespace.
//!
//! # Examples
//!
//! ```
//! use roomwiki_persistence::tenant::{NamespaceContext, RoomId};
//!
//! let room: RoomId = "acme".parse().unwrap();
//! let ctx = NamespaceContext::resolve(room);
//! assert_eq!(ctx.namespace(), Some("tenant_acme"));
//!
//! let shared = NamespaceContext::shared();
//! assert!(shared.is_shared());
//! ```

mod context;
mod id;
pub mod namespace;

pub use context::NamespaceContext;
pub use id::{ALL_ROOMS, PUBLIC_ROOM, RoomId, is_valid_room_id};
