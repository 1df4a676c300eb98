//! Catalog schema definitions
//!
//! Every statement is written against the `{ns}` placeholder and qualified
//! with [`qualify`] for the engine's namespace. Foreign keys name their
//! parent table unqualified: SQLite resolves them within the child's schema.

/// SQL to create the concept registry
pub const CREATE_CONCEPT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."concept" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
)
"#;

/// SQL to create the concept-link registry
pub const CREATE_CONCEPT_MAP_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."concept_map" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL,
    target_id INTEGER NOT NULL,
    link_type VARCHAR(255) NOT NULL,
    mapping CHAR(2) NOT NULL,
    FOREIGN KEY (source_id) REFERENCES concept(id) ON DELETE CASCADE,
    FOREIGN KEY (target_id) REFERENCES concept(id) ON DELETE CASCADE
)
"#;

/// SQL to create the entity table referenced by every concept table
pub const CREATE_ENTITY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."entity" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    concept_id INTEGER,
    FOREIGN KEY (concept_id) REFERENCES concept(id) ON DELETE CASCADE
)
"#;

/// SQL to create the entity-edge registry
pub const CREATE_ENTITY_MAP_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."entity_map" (
    source_entity_id INTEGER NOT NULL,
    target_entity_id INTEGER NOT NULL,
    link_type_id INTEGER NOT NULL,
    weight INTEGER NOT NULL,
    PRIMARY KEY (source_entity_id, target_entity_id, link_type_id),
    FOREIGN KEY (source_entity_id) REFERENCES entity(id) ON DELETE CASCADE,
    FOREIGN KEY (target_entity_id) REFERENCES entity(id) ON DELETE CASCADE,
    FOREIGN KEY (link_type_id) REFERENCES concept_map(id) ON DELETE RESTRICT
)
"#;

/// SQL to create the table inheritance registry.
/// One row per (derived table, parent table), ordered by declaration.
pub const CREATE_INHERITANCE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."inheritance" (
    table_name TEXT NOT NULL,
    parent_table TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (table_name, position)
)
"#;

/// SQL to create the attribute provenance registry.
/// One row per attribute a concept declares itself, with the declared
/// constraint; inherited columns a concept does not redeclare have no row.
pub const CREATE_ATTRIBUTE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "{ns}"."attribute" (
    table_name TEXT NOT NULL,
    name TEXT NOT NULL,
    required INTEGER NOT NULL,
    default_value TEXT,
    PRIMARY KEY (table_name, name)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    r#"CREATE INDEX IF NOT EXISTS "{ns}"."idx_concept_name" ON "concept"(name)"#,
    r#"CREATE INDEX IF NOT EXISTS "{ns}"."idx_concept_map_source" ON "concept_map"(source_id)"#,
    r#"CREATE INDEX IF NOT EXISTS "{ns}"."idx_concept_map_target" ON "concept_map"(target_id)"#,
];

/// Substitute the namespace into a statement template
pub fn qualify(template: &str, namespace: &str) -> String {
    template.replace("{ns}", namespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualify() {
        let sql = qualify(CREATE_CONCEPT_TABLE, "meta");
        assert!(sql.contains(r#""meta"."concept""#));
        assert!(!sql.contains("{ns}"));
    }
}
