//! SQLite backend implementation.
//!
//! A complete [`WikiStore`](crate::store::WikiStore) implementation over a
//! pooled SQLite database. Supports both in-memory databases (great for
//! testing) and file-based databases (development and small deployments).
//!
//! # Namespace emulation
//!
//! SQLite has no schemas, so tenant namespaces are emulated with validated
//! table-name prefixes: room `acme` stores its pages in `tenant_acme_pages`
//! and `tenant_acme_page_versions`, while the shared namespace uses the
//! unprefixed `pages` and `page_versions` tables. Prefixes are derived from
//! a validated [`RoomId`](crate::tenant::RoomId), never raw input.
//!
//! # Example
//!
//! ```no_run
//! use roomwiki_persistence::backends::sqlite::SqliteBackend;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod schema;
mod store;

pub use backend::{SqliteBackend, SqliteBackendConfig};
