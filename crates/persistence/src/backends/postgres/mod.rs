//! PostgreSQL backend implementation.
//!
//! Tenant namespaces are real database schemas. Every namespaced operation
//! runs in a transaction that issues `SET LOCAL search_path` with the
//! tenant schema first and `public` second, so shared entities stay
//! reachable while page tables resolve to the tenant's own copies. The
//! `LOCAL` scope ties the selection to the transaction, so it can never
//! leak across pooled connections.
//!
//! # Example
//!
//! ```no_run
//! use roomwiki_persistence::backends::postgres::{PostgresBackend, PostgresBackendConfig};
//!
//! # async fn main_example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = PostgresBackend::new(PostgresBackendConfig::default()).await?;
//! backend.init_schema().await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod store;

pub use backend::{PostgresBackend, PostgresBackendConfig};
