//! SQLite schema definitions.
//!
//! The shared namespace holds the user directory, room directory,
//! memberships, shared links, feedback, and the shared room's own pages.
//! Tenant namespaces get structural copies of the page tables via
//! [`ensure_namespace_tables`], created lazily and idempotently.

use rusqlite::Connection;

use crate::error::WikiResult;

/// Creates the shared-namespace tables. Safe to run repeatedly.
pub fn initialize_schema(conn: &Connection) -> WikiResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            token TEXT UNIQUE,
            is_superuser INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS rooms (
            name TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            public_slug TEXT UNIQUE,
            logo_url TEXT,
            welcome_page_id INTEGER,
            public_title TEXT,
            public_subtitle TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS memberships (
            user_id INTEGER NOT NULL,
            room_name TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'Viewer',
            PRIMARY KEY (user_id, room_name)
        );

        CREATE TABLE IF NOT EXISTS shared_links (
            token TEXT PRIMARY KEY,
            room_name TEXT NOT NULL,
            page_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT
        );

        CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            room_name TEXT NOT NULL,
            message TEXT NOT NULL,
            author_name TEXT,
            author_org TEXT,
            created_at TEXT NOT NULL
        );",
    )?;

    // Shared room's own page tables, unprefixed.
    conn.execute_batch(&page_tables_sql("pages", "page_versions"))?;
    Ok(())
}

/// Creates a tenant namespace's page tables, mirroring the shared page
/// schema. Idempotent; safe under concurrent first access to a new room.
///
/// Table names are derived from a validated namespace name and contain
/// only `[a-z0-9_]`.
pub fn ensure_namespace_tables(conn: &Connection, namespace: &str) -> WikiResult<()> {
    let pages = format!("{}_pages", namespace);
    let versions = format!("{}_page_versions", namespace);
    conn.execute_batch(&page_tables_sql(&pages, &versions))?;
    Ok(())
}

/// Drops a tenant namespace's page tables.
pub fn drop_namespace_tables(conn: &Connection, namespace: &str) -> WikiResult<()> {
    conn.execute_batch(&format!(
        "DROP TABLE IF EXISTS {ns}_pages;
         DROP TABLE IF EXISTS {ns}_page_versions;",
        ns = namespace
    ))?;
    Ok(())
}

fn page_tables_sql(pages: &str, versions: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {pages} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            path TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            created_by TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            updated_by TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS {versions} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            page_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            edited_by TEXT NOT NULL,
            edited_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS {versions}_page_idx ON {versions}(page_id);"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        ensure_namespace_tables(&conn, "tenant_acme").unwrap();
        ensure_namespace_tables(&conn, "tenant_acme").unwrap();
        conn.execute(
            "INSERT INTO tenant_acme_pages
             (title, slug, content, path, created_at, created_by, updated_at, updated_by)
             VALUES ('T', 't', 'null', 't', '2024-01-01T00:00:00Z', 'u', '2024-01-01T00:00:00Z', 'u')",
            [],
        )
        .unwrap();
        // Re-running provisioning must not destroy existing data
        ensure_namespace_tables(&conn, "tenant_acme").unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tenant_acme_pages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_drop_namespace_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        ensure_namespace_tables(&conn, "tenant_acme").unwrap();
        drop_namespace_tables(&conn, "tenant_acme").unwrap();
        assert!(
            conn.query_row("SELECT COUNT(*) FROM tenant_acme_pages", [], |r| r
                .get::<_, i64>(0))
                .is_err()
        );
    }
}
