//! Storage Layer - SQLite-backed catalog
//!
//! Everything lives in one namespace (an attached SQLite schema) with tables:
//! - concept(id, name)
//! - concept_map(id, source_id, target_id, link_type, mapping)
//! - entity(id, concept_id)
//! - entity_map(source_entity_id, target_entity_id, link_type_id, weight)
//! - inheritance(table_name, parent_table, position)
//! - attribute(table_name, name, required, default_value)
//! - <concept>_data(entity_id, <attribute columns>...) per concept

pub mod schema;
pub mod sqlite;
pub mod catalog;
pub mod introspect;

pub use catalog::{ensure_catalog, AttributeTable, CatalogTable, ConceptMapTable, ConceptTable, EntityMapTable, EntityTable, InheritanceTable};
pub use introspect::{ColumnInfo, DeclaredAttribute, Introspector, LinkRow};
pub use sqlite::{open, open_in_memory};
