//! SQLite backend setup: connection pool and configuration.

use std::fmt::Debug;
use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

use crate::error::{WikiError, WikiResult};

use super::schema;

/// SQLite backend for wiki storage.
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for better concurrency.
    #[serde(default = "default_true")]
    pub enable_wal: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
        }
    }
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    ///
    /// Uses a uniquely named shared-cache memory database so every pooled
    /// connection sees the same data; the pool's idle minimum keeps the
    /// database alive for the backend's lifetime.
    pub fn in_memory() -> WikiResult<Self> {
        let name = format!(
            "file:roomwiki_{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4().simple()
        );
        let manager = SqliteConnectionManager::file(&name).with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        );
        Self::build(manager, SqliteBackendConfig::default(), true)
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> WikiResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Opens a file-based database with custom configuration.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteBackendConfig,
    ) -> WikiResult<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref());
        Self::build(manager, config, false)
    }

    fn build(
        manager: SqliteConnectionManager,
        config: SqliteBackendConfig,
        is_memory: bool,
    ) -> WikiResult<Self> {
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(std::time::Duration::from_millis(
                config.connection_timeout_ms,
            ))
            .build(manager)
            .map_err(|e| WikiError::backend("sqlite", format!("connection failed: {}", e)))?;

        let backend = Self {
            pool,
            config,
            is_memory,
        };
        backend.configure_connection()?;
        Ok(backend)
    }

    /// Initialize the shared-namespace schema.
    pub fn init_schema(&self) -> WikiResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(
        &self,
    ) -> WikiResult<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| WikiError::backend("sqlite", format!("connection failed: {}", e)))
    }

    fn configure_connection(&self) -> WikiResult<()> {
        let conn = self.get_connection()?;

        conn.busy_timeout(std::time::Duration::from_millis(
            self.config.busy_timeout_ms as u64,
        ))
        .map_err(|e| WikiError::backend("sqlite", format!("failed to set busy timeout: {}", e)))?;

        if self.config.enable_wal && !self.is_memory {
            conn.execute_batch("PRAGMA journal_mode = WAL")
                .map_err(|e| {
                    WikiError::backend("sqlite", format!("failed to enable WAL mode: {}", e))
                })?;
        }

        Ok(())
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }
}
