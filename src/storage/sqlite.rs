//! SQLite connections with the catalog namespace attached

use std::path::Path;
use rusqlite::Connection;
use crate::naming::validate_identifier;
use crate::Result;

/// Open a catalog database file under `namespace` (creates if it doesn't exist).
///
/// The file is attached as schema `namespace` so that every managed table
/// can be referenced as `namespace.table`. The `main` namespace opens the
/// file directly.
pub fn open(path: &Path, namespace: &str) -> Result<Connection> {
    validate_identifier(namespace)?;
    let conn = if namespace == "main" {
        Connection::open(path)?
    } else {
        let conn = Connection::open_in_memory()?;
        attach(&conn, &path.to_string_lossy(), namespace)?;
        conn
    };
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

/// Open an in-memory catalog (for testing)
pub fn open_in_memory(namespace: &str) -> Result<Connection> {
    validate_identifier(namespace)?;
    let conn = Connection::open_in_memory()?;
    if namespace != "main" {
        attach(&conn, ":memory:", namespace)?;
    }
    enable_foreign_keys(&conn)?;
    Ok(conn)
}

fn attach(conn: &Connection, location: &str, namespace: &str) -> Result<()> {
    let sql = format!(r#"ATTACH DATABASE ?1 AS "{}""#, namespace);
    conn.execute(&sql, [location])?;
    Ok(())
}

fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_namespace_is_attached() {
        let conn = open_in_memory("caos").unwrap();
        conn.execute_batch(r#"CREATE TABLE "caos"."probe" (id INTEGER)"#).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM caos.sqlite_master WHERE name = 'probe'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_file_catalog_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let conn = open(&path, "caos").unwrap();
            conn.execute_batch(r#"CREATE TABLE "caos"."probe" (id INTEGER)"#).unwrap();
        }

        let conn = open(&path, "caos").unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM caos.sqlite_master WHERE name = 'probe'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_invalid_namespace() {
        assert!(open_in_memory("bad name").is_err());
    }
}
