//! Roomwiki Persistence Layer
//!
//! This crate provides the storage layer for the multi-tenant wiki platform.
//! Each room ("tenant") gets its own namespace for pages and page versions,
//! while users, rooms, memberships, shared links and feedback live in a
//! shared namespace. Backends are selected via feature flags.
//!
//! # Backend Features
//!
//! Enable backends with feature flags in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! roomwiki-persistence = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! Available backend features:
//! - `sqlite` (default) - SQLite with in-memory and file modes; tenant
//!   namespaces are emulated with table-name prefixes
//! - `postgres` - PostgreSQL with real schema-per-tenant isolation via
//!   `SET LOCAL search_path`
//!
//! # Architecture
//!
//! - [`tenant`] - Room identifiers and namespace resolution
//! - [`path`] - Materialized-path algebra for hierarchical pages
//! - [`access`] - Role hierarchy and access checks
//! - [`types`] - Core domain types (users, rooms, pages, versions)
//! - [`search`] - Deterministic ranking, excerpts and highlighting
//! - [`tree`] - Page-forest assembly from path-ordered rows
//! - [`error`] - Error taxonomy for all operations
//! - [`store`] - The [`WikiStore`](store::WikiStore) trait
//! - [`backends`] - Backend implementations
//!
//! # Quick Start
//!
//! ```no_run
//! use roomwiki_persistence::backends::sqlite::SqliteBackend;
//! use roomwiki_persistence::store::WikiStore;
//! use roomwiki_persistence::tenant::{NamespaceContext, RoomId};
//! use roomwiki_persistence::types::NewPage;
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteBackend::in_memory()?;
//! store.init_schema()?;
//!
//! let admin = store.create_user("admin", "secret-token", true).await?;
//! let room = store
//!     .create_room(&(&admin).into(), &RoomId::new("acme")?, "Acme Corp")
//!     .await?;
//!
//! let ctx = NamespaceContext::resolve(room.name.clone());
//! let page = store
//!     .create_page(
//!         &ctx,
//!         &(&admin).into(),
//!         NewPage {
//!             title: "Introduction".into(),
//!             slug: "intro".into(),
//!             content: json!({"blocks": []}),
//!             parent_path: None,
//!         },
//!     )
//!     .await?;
//! assert_eq!(page.path.as_str(), "intro");
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod backends;
pub mod error;
pub mod path;
pub mod search;
pub mod store;
pub mod tenant;
pub mod tree;
pub mod types;

pub use error::{WikiError, WikiResult};
pub use store::WikiStore;
pub use tenant::{NamespaceContext, RoomId};
