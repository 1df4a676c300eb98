//! Read-only queries against the physical catalog

use rusqlite::Connection;
use crate::link::{Link, Mapping};
use crate::naming::{NameMangler, TABLE_SUFFIX};
use crate::Result;

/// A column of a physical table, as declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub required: bool,
    pub default: Option<String>,
}

/// An attribute as its concept declared it, from the provenance registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredAttribute {
    pub name: String,
    pub required: bool,
    pub default: Option<String>,
}

/// A row of the concept-link registry with names resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    pub id: i64,
    pub source: String,
    pub target: String,
    pub link_type: String,
    pub mapping: String,
}

impl LinkRow {
    /// Convert to a `Link`; an unknown mapping code means a corrupt catalog
    pub fn to_link(&self) -> Result<Link> {
        let mapping: Mapping = self.mapping.parse()?;
        Ok(Link::new(&self.source, &self.target, &self.link_type, mapping))
    }
}

/// Introspection over one namespace of a live connection
pub struct Introspector<'a> {
    conn: &'a Connection,
    mangler: &'a NameMangler,
}

impl<'a> Introspector<'a> {
    pub fn new(conn: &'a Connection, mangler: &'a NameMangler) -> Self {
        Self { conn, mangler }
    }

    /// Physical names of all concept tables in the namespace
    pub fn list_managed_tables(&self) -> Result<Vec<String>> {
        let sql = format!(
            r#"SELECT name FROM "{}".sqlite_master WHERE type = 'table' AND name GLOB ?1 ORDER BY name"#,
            self.mangler.namespace()
        );
        // GLOB is case-sensitive, unlike LIKE
        let pattern = format!("*{}", TABLE_SUFFIX);

        let mut stmt = self.conn.prepare(&sql)?;
        let tables = stmt
            .query_map([pattern], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tables)
    }

    /// Columns of `table` in declaration order, identity column included
    pub fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let sql = format!(
            r#"PRAGMA "{}".table_info("{}")"#,
            self.mangler.namespace(),
            table
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| {
                let not_null: i64 = row.get(3)?;
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    column_type: row.get(2)?,
                    required: not_null != 0,
                    default: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    /// Direct parent tables of `table`, in declaration order
    pub fn list_inheritance_chain(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT parent_table FROM {} WHERE table_name = ?1 ORDER BY position",
            self.mangler.qualify("inheritance")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let parents = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(parents)
    }

    /// Attributes `table` declares itself, by name
    pub fn list_declared_attributes(&self, table: &str) -> Result<Vec<DeclaredAttribute>> {
        let sql = format!(
            "SELECT name, required, default_value FROM {} WHERE table_name = ?1 ORDER BY name",
            self.mangler.qualify("attribute")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let declared = stmt
            .query_map([table], |row| {
                Ok(DeclaredAttribute {
                    name: row.get(0)?,
                    required: row.get(1)?,
                    default: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(declared)
    }

    /// Registered links whose source is `concept`
    pub fn list_links_by_source(&self, concept: &str) -> Result<Vec<LinkRow>> {
        self.list_links("s.name = ?1", concept)
    }

    /// Registered links whose target is `concept`
    pub fn list_links_by_target(&self, concept: &str) -> Result<Vec<LinkRow>> {
        self.list_links("t.name = ?1", concept)
    }

    fn list_links(&self, filter: &str, concept: &str) -> Result<Vec<LinkRow>> {
        let sql = format!(
            r#"
            SELECT cm.id, s.name, t.name, cm.link_type, cm.mapping
            FROM {map} AS cm
            JOIN {concept} AS s ON s.id = cm.source_id
            JOIN {concept} AS t ON t.id = cm.target_id
            WHERE {filter}
            ORDER BY cm.id
            "#,
            map = self.mangler.qualify("concept_map"),
            concept = self.mangler.qualify("concept"),
            filter = filter,
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([concept], |row| {
                Ok(LinkRow {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    target: row.get(2)?,
                    link_type: row.get(3)?,
                    mapping: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::catalog::{ensure_catalog, ConceptMapTable, ConceptTable, InheritanceTable};
    use crate::storage::sqlite::open_in_memory;

    fn setup() -> (Connection, NameMangler) {
        let conn = open_in_memory("caos").unwrap();
        ensure_catalog(&conn, "caos").unwrap();
        (conn, NameMangler::default())
    }

    #[test]
    fn test_list_managed_tables_only_data_tables() {
        let (conn, mangler) = setup();
        conn.execute_batch(
            r#"
            CREATE TABLE "caos"."Person_data" (entity_id INTEGER NOT NULL);
            CREATE TABLE "caos"."Address_data" (entity_id INTEGER NOT NULL);
            CREATE TABLE "caos"."scratch" (id INTEGER);
            CREATE TABLE "caos"."xdata" (id INTEGER);
            CREATE TABLE "caos"."Shout_DATA" (id INTEGER);
            "#,
        )
        .unwrap();

        let tables = Introspector::new(&conn, &mangler).list_managed_tables().unwrap();
        assert_eq!(tables, vec!["Address_data".to_string(), "Person_data".to_string()]);
    }

    #[test]
    fn test_list_declared_attributes() {
        let (conn, mangler) = setup();
        conn.execute_batch(
            r#"
            INSERT INTO "caos"."attribute" VALUES ('Derived_data', 'code', 1, NULL);
            INSERT INTO "caos"."attribute" VALUES ('Derived_data', 'body', 0, '0');
            INSERT INTO "caos"."attribute" VALUES ('Base_data', 'code', 0, NULL);
            "#,
        )
        .unwrap();

        let declared = Introspector::new(&conn, &mangler).list_declared_attributes("Derived_data").unwrap();
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].name, "body");
        assert_eq!(declared[0].default.as_deref(), Some("0"));
        assert!(declared[1].required);
    }

    #[test]
    fn test_list_columns() {
        let (conn, mangler) = setup();
        conn.execute_batch(
            r#"CREATE TABLE "caos"."Person_data" (entity_id INTEGER NOT NULL, "name" TEXT NOT NULL DEFAULT 'anon', "age" INTEGER)"#,
        )
        .unwrap();

        let columns = Introspector::new(&conn, &mangler).list_columns("Person_data").unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "entity_id");
        assert_eq!(columns[1].column_type, "TEXT");
        assert!(columns[1].required);
        assert_eq!(columns[1].default.as_deref(), Some("'anon'"));
        assert!(!columns[2].required);
        assert_eq!(columns[2].default, None);
    }

    #[test]
    fn test_list_links_both_directions() {
        let (conn, mangler) = setup();
        ConceptTable::insert(&conn, "caos", "Person").unwrap();
        ConceptTable::insert(&conn, "caos", "Address").unwrap();
        ConceptMapTable::insert(&conn, "caos", &Link::new("Person", "Address", "lives_at", Mapping::ManyToOne)).unwrap();

        let introspector = Introspector::new(&conn, &mangler);
        let outbound = introspector.list_links_by_source("Person").unwrap();
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].target, "Address");

        let inbound = introspector.list_links_by_target("Address").unwrap();
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].source, "Person");
        assert_eq!(inbound[0].to_link().unwrap().mapping, Mapping::ManyToOne);

        assert!(introspector.list_links_by_source("Address").unwrap().is_empty());
    }

    #[test]
    fn test_list_inheritance_chain() {
        let (conn, mangler) = setup();
        InheritanceTable::insert(&conn, "caos", "C_data", &["A_data".to_string(), "B_data".to_string()]).unwrap();

        let chain = Introspector::new(&conn, &mangler).list_inheritance_chain("C_data").unwrap();
        assert_eq!(chain, vec!["A_data".to_string(), "B_data".to_string()]);
    }

    #[test]
    fn test_corrupt_mapping_code() {
        let row = LinkRow {
            id: 1,
            source: "A".to_string(),
            target: "B".to_string(),
            link_type: "rel".to_string(),
            mapping: "?!".to_string(),
        };
        assert!(matches!(row.to_link(), Err(crate::Error::CorruptSchema(_))));
    }
}
