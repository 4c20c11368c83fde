//! Namespace name derivation and SQL helpers.
//!
//! Tenant namespaces are named `tenant_{room}` (lowercased). The room
//! identifier has already passed charset validation by the time it reaches
//! this module, so the derived names contain only `[a-z0-9_]`. Room
//! creation rejects names that collide case-insensitively, so distinct
//! rooms never map to the same namespace.

use super::id::RoomId;

/// Prefix for tenant namespace names.
pub const NAMESPACE_PREFIX: &str = "tenant_";

/// Derives the namespace name for a room.
pub fn namespace_for(room: &RoomId) -> String {
    format!("{}{}", NAMESPACE_PREFIX, room.as_str().to_lowercase())
}

/// Escapes an identifier for interpolation into DDL, doubling any embedded
/// double quotes. Namespace names derived here never contain quotes; this
/// guards the general helper.
pub fn escape_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// `SET search_path` statement consulting the tenant namespace first and
/// the shared namespace second.
#[cfg(feature = "postgres")]
pub fn set_search_path_sql(namespace: &str) -> String {
    format!(
        "SET LOCAL search_path TO {}, public",
        escape_identifier(namespace)
    )
}

/// Idempotent schema creation statement.
#[cfg(feature = "postgres")]
pub fn create_schema_sql(namespace: &str) -> String {
    format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        escape_identifier(namespace)
    )
}

/// Schema drop statement cascading to the namespace's contents.
#[cfg(feature = "postgres")]
pub fn drop_schema_sql(namespace: &str) -> String {
    format!(
        "DROP SCHEMA IF EXISTS {} CASCADE",
        escape_identifier(namespace)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_for_lowercases() {
        let room: RoomId = "Acme_2024".parse().unwrap();
        assert_eq!(namespace_for(&room), "tenant_acme_2024");
    }

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("tenant_acme"), "\"tenant_acme\"");
        assert_eq!(escape_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_search_path_sql() {
        assert_eq!(
            set_search_path_sql("tenant_acme"),
            "SET LOCAL search_path TO \"tenant_acme\", public"
        );
    }
}
