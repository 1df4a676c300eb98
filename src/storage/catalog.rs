//! Catalog tables owned by the engine

use std::collections::BTreeMap;
use rusqlite::{Connection, ErrorCode, params};
use crate::concept::Attribute;
use crate::link::Link;
use crate::{Error, Result};
use super::schema;

/// A fixed catalog table with idempotent creation
pub trait CatalogTable {
    /// Unqualified table name
    const NAME: &'static str;
    /// Creation statement template, see [`schema::qualify`]
    const CREATE: &'static str;

    /// Create the table in `namespace` unless it already exists
    fn ensure_exists(conn: &Connection, namespace: &str) -> Result<()> {
        conn.execute_batch(&schema::qualify(Self::CREATE, namespace))
            .map_err(|cause| Error::Initialization { table: Self::NAME, cause })
    }
}

/// Concept registry: `(id, name)`
pub struct ConceptTable;

impl CatalogTable for ConceptTable {
    const NAME: &'static str = "concept";
    const CREATE: &'static str = schema::CREATE_CONCEPT_TABLE;
}

impl ConceptTable {
    /// Register a concept, returning its generated id
    pub fn insert(conn: &Connection, namespace: &str, name: &str) -> Result<i64> {
        let sql = format!(r#"INSERT INTO "{}"."concept"(name) VALUES (?1) RETURNING id"#, namespace);
        let id = conn.query_row(&sql, [name], |row| row.get(0))?;
        Ok(id)
    }
}

/// Concept-link registry: `(id, source_id, target_id, link_type, mapping)`
pub struct ConceptMapTable;

impl CatalogTable for ConceptMapTable {
    const NAME: &'static str = "concept_map";
    const CREATE: &'static str = schema::CREATE_CONCEPT_MAP_TABLE;
}

impl ConceptMapTable {
    /// Register a link type, resolving both concept names in the same
    /// statement. An unresolved name violates the row's constraints and is
    /// reported as [`Error::LinkResolution`].
    pub fn insert(conn: &Connection, namespace: &str, link: &Link) -> Result<i64> {
        let sql = format!(
            r#"
            INSERT INTO "{ns}"."concept_map"(source_id, target_id, link_type, mapping)
            VALUES (
                (SELECT id FROM "{ns}"."concept" WHERE name = ?1),
                (SELECT id FROM "{ns}"."concept" WHERE name = ?2),
                ?3,
                ?4
            ) RETURNING id
            "#,
            ns = namespace
        );

        conn.query_row(
            &sql,
            params![link.source, link.target, link.link_type, link.mapping.as_str()],
            |row| row.get(0),
        )
        .map_err(|cause| {
            if cause.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
                Error::LinkResolution {
                    from: link.source.clone(),
                    to: link.target.clone(),
                    link_type: link.link_type.clone(),
                    cause,
                }
            } else {
                Error::Storage(cause)
            }
        })
    }
}

/// Entity table referenced by the identity column of every concept table
pub struct EntityTable;

impl CatalogTable for EntityTable {
    const NAME: &'static str = "entity";
    const CREATE: &'static str = schema::CREATE_ENTITY_TABLE;
}

/// Entity-edge registry. Rows are written by whoever manages entities.
pub struct EntityMapTable;

impl CatalogTable for EntityMapTable {
    const NAME: &'static str = "entity_map";
    const CREATE: &'static str = schema::CREATE_ENTITY_MAP_TABLE;
}

/// Table inheritance registry: `(table_name, parent_table, position)`
pub struct InheritanceTable;

impl CatalogTable for InheritanceTable {
    const NAME: &'static str = "inheritance";
    const CREATE: &'static str = schema::CREATE_INHERITANCE_TABLE;
}

impl InheritanceTable {
    /// Record the ordered parent tables of `table_name`
    pub fn insert(conn: &Connection, namespace: &str, table_name: &str, parents: &[String]) -> Result<()> {
        let sql = format!(
            r#"INSERT INTO "{}"."inheritance"(table_name, parent_table, position) VALUES (?1, ?2, ?3)"#,
            namespace
        );
        let mut stmt = conn.prepare(&sql)?;
        for (position, parent) in parents.iter().enumerate() {
            stmt.execute(params![table_name, parent, position as i64])?;
        }
        Ok(())
    }
}

/// Attribute provenance registry: `(table_name, name, required, default_value)`
pub struct AttributeTable;

impl CatalogTable for AttributeTable {
    const NAME: &'static str = "attribute";
    const CREATE: &'static str = schema::CREATE_ATTRIBUTE_TABLE;
}

impl AttributeTable {
    /// Record the attributes `table_name` declares itself, as declared
    pub fn insert(
        conn: &Connection,
        namespace: &str,
        table_name: &str,
        attributes: &BTreeMap<String, Attribute>,
    ) -> Result<()> {
        let sql = format!(
            r#"INSERT INTO "{}"."attribute"(table_name, name, required, default_value) VALUES (?1, ?2, ?3, ?4)"#,
            namespace
        );
        let mut stmt = conn.prepare(&sql)?;
        for (name, attribute) in attributes {
            stmt.execute(params![table_name, name, attribute.required, attribute.default])?;
        }
        Ok(())
    }
}

/// Create every catalog table and index in `namespace`.
///
/// Order matters: later tables reference earlier ones.
pub fn ensure_catalog(conn: &Connection, namespace: &str) -> Result<()> {
    ConceptTable::ensure_exists(conn, namespace)?;
    ConceptMapTable::ensure_exists(conn, namespace)?;
    EntityTable::ensure_exists(conn, namespace)?;
    EntityMapTable::ensure_exists(conn, namespace)?;
    InheritanceTable::ensure_exists(conn, namespace)?;
    AttributeTable::ensure_exists(conn, namespace)?;

    for stmt in schema::CREATE_INDEXES {
        conn.execute_batch(&schema::qualify(stmt, namespace))
            .map_err(|cause| Error::Initialization { table: "index", cause })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Domain, ScalarType};
    use crate::link::Mapping;
    use crate::storage::sqlite::open_in_memory;

    fn catalog() -> Connection {
        let conn = open_in_memory("caos").unwrap();
        ensure_catalog(&conn, "caos").unwrap();
        conn
    }

    #[test]
    fn test_ensure_catalog_is_idempotent() {
        let conn = catalog();
        ensure_catalog(&conn, "caos").unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM caos.sqlite_master WHERE type = 'table' AND name IN ('concept', 'concept_map', 'entity', 'entity_map', 'inheritance', 'attribute')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 6);
    }

    #[test]
    fn test_ensure_exists_reports_failing_table() {
        let conn = open_in_memory("caos").unwrap();
        // An index may not share its name with a table, even with IF NOT EXISTS
        conn.execute_batch(
            r#"
            CREATE TABLE "caos"."scratch" (x INTEGER);
            CREATE INDEX "caos"."concept" ON "scratch"(x);
            "#,
        )
        .unwrap();

        let err = ensure_catalog(&conn, "caos").unwrap_err();
        assert!(matches!(err, Error::Initialization { table: "concept", .. }));
    }

    #[test]
    fn test_attribute_insert_records_declaration() {
        let conn = catalog();
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "code".to_string(),
            Attribute::new(Domain::for_attribute("Derived", "code", ScalarType::Text), true)
                .with_default("'x'"),
        );
        AttributeTable::insert(&conn, "caos", "Derived_data", &attributes).unwrap();

        let (required, default): (bool, Option<String>) = conn
            .query_row(
                "SELECT required, default_value FROM caos.attribute WHERE table_name = 'Derived_data' AND name = 'code'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(required);
        assert_eq!(default.as_deref(), Some("'x'"));
    }

    #[test]
    fn test_concept_insert_returns_ids() {
        let conn = catalog();
        let first = ConceptTable::insert(&conn, "caos", "Person").unwrap();
        let second = ConceptTable::insert(&conn, "caos", "Address").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_concept_map_insert_resolves_names() {
        let conn = catalog();
        let person = ConceptTable::insert(&conn, "caos", "Person").unwrap();
        let address = ConceptTable::insert(&conn, "caos", "Address").unwrap();

        let link = Link::new("Person", "Address", "lives_at", Mapping::ManyToOne);
        let id = ConceptMapTable::insert(&conn, "caos", &link).unwrap();

        let (source_id, target_id, mapping): (i64, i64, String) = conn
            .query_row(
                "SELECT source_id, target_id, mapping FROM caos.concept_map WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(source_id, person);
        assert_eq!(target_id, address);
        assert_eq!(mapping, "*1");
    }

    #[test]
    fn test_concept_map_insert_unresolved_target() {
        let conn = catalog();
        ConceptTable::insert(&conn, "caos", "Person").unwrap();

        let link = Link::new("Person", "Ghost", "haunts", Mapping::OneToOne);
        let err = ConceptMapTable::insert(&conn, "caos", &link).unwrap_err();
        assert!(matches!(err, Error::LinkResolution { ref to, .. } if to == "Ghost"));
    }

    #[test]
    fn test_inheritance_insert_keeps_order() {
        let conn = catalog();
        let parents = vec!["B_data".to_string(), "A_data".to_string()];
        InheritanceTable::insert(&conn, "caos", "C_data", &parents).unwrap();

        let mut stmt = conn
            .prepare("SELECT parent_table FROM caos.inheritance WHERE table_name = 'C_data' ORDER BY position")
            .unwrap();
        let stored: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(stored, parents);
    }
}
