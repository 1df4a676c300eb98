//! Synchronization engine implementation

use std::collections::{BTreeMap, HashSet};
use rusqlite::Connection;
use tracing::{debug, info};
use crate::concept::{Attribute, Concept, IDENTITY_COLUMN};
use crate::domain::{DomainTranslator, SqliteTypeTranslator};
use crate::naming::{validate_identifier, NameMangler};
use crate::sink::{ErrorSink, TracingSink};
use crate::storage::{
    ensure_catalog, AttributeTable, ColumnInfo, ConceptMapTable, ConceptTable, DeclaredAttribute, InheritanceTable,
    Introspector,
};
use crate::{ContextEntry, Error, Result, ResultExt};
use super::Phase;

/// Inheritance chains deeper than this are treated as a corrupt catalog
pub const MAX_INHERITANCE_DEPTH: usize = 64;

/// A column as it will be declared in a concept table
#[derive(Debug, Clone)]
struct ColumnDef {
    name: String,
    column_type: String,
    required: bool,
    default: Option<String>,
}

impl From<ColumnInfo> for ColumnDef {
    fn from(info: ColumnInfo) -> Self {
        Self {
            name: info.name,
            column_type: info.column_type,
            required: info.required,
            default: info.default,
        }
    }
}

/// Keeps concepts and their physical tables in sync over one connection.
///
/// The set of known concepts is snapshotted at construction. Concepts this
/// engine creates are added to the snapshot; tables created by other
/// writers stay invisible until [`SyncEngine::refresh`].
pub struct SyncEngine {
    conn: Connection,
    mangler: NameMangler,
    translator: Box<dyn DomainTranslator>,
    sink: Box<dyn ErrorSink>,
    /// Logical concept name -> unqualified table name
    concepts: BTreeMap<String, String>,
}

impl SyncEngine {
    /// Create an engine over `conn`, whose `namespace` schema must be attached
    pub fn new(conn: Connection, namespace: &str) -> Result<Self> {
        Self::with_parts(
            conn,
            NameMangler::new(namespace)?,
            Box::new(SqliteTypeTranslator),
            Box::new(TracingSink),
        )
    }

    /// Create an engine with an explicit translator and error sink.
    ///
    /// Snapshots the managed tables, then ensures every catalog table exists.
    pub fn with_parts(
        conn: Connection,
        mangler: NameMangler,
        translator: Box<dyn DomainTranslator>,
        sink: Box<dyn ErrorSink>,
    ) -> Result<Self> {
        let concepts = snapshot(&conn, &mangler)?;
        ensure_catalog(&conn, mangler.namespace())?;
        debug!("Snapshot of namespace {}: {} concepts", mangler.namespace(), concepts.len());

        Ok(Self {
            conn,
            mangler,
            translator,
            sink,
            concepts,
        })
    }

    pub fn with_translator(mut self, translator: impl DomainTranslator + 'static) -> Self {
        self.translator = Box::new(translator);
        self
    }

    pub fn with_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn mangler(&self) -> &NameMangler {
        &self.mangler
    }

    /// Whether `name` is in the snapshot
    pub fn contains(&self, name: &str) -> bool {
        self.concepts.contains_key(name)
    }

    /// Known concept names in snapshot order
    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.concepts.keys().map(String::as_str)
    }

    /// Re-take the snapshot of managed tables
    pub fn refresh(&mut self) -> Result<()> {
        self.concepts = snapshot(&self.conn, &self.mangler)?;
        debug!("Refreshed snapshot: {} concepts", self.concepts.len());
        Ok(())
    }

    // ========== Load ==========

    /// Reconstruct a concept from its physical table and catalog rows.
    ///
    /// Parent concepts are loaded recursively into `bases`.
    pub fn load(&self, name: &str) -> Result<Concept> {
        let mut path = Vec::new();
        self.load_at(name, &mut path)
    }

    fn load_at(&self, name: &str, path: &mut Vec<String>) -> Result<Concept> {
        if path.iter().any(|p| p == name) {
            return Err(Error::CorruptSchema(format!(
                "inheritance cycle: {} -> {}",
                path.join(" -> "),
                name
            )));
        }
        if path.len() >= MAX_INHERITANCE_DEPTH {
            return Err(Error::CorruptSchema(format!(
                "inheritance of \"{}\" is deeper than {} levels",
                name, MAX_INHERITANCE_DEPTH
            )));
        }

        let table = self
            .concepts
            .get(name)
            .ok_or_else(|| Error::UndefinedConcept(name.to_string()))?;
        let introspector = Introspector::new(&self.conn, &self.mangler);

        // Parents first: their columns are the inherited part of ours
        let parent_tables: Vec<String> = introspector
            .list_inheritance_chain(table)?
            .into_iter()
            .filter(|t| t != table)
            .collect();

        path.push(name.to_string());
        let mut bases = Vec::with_capacity(parent_tables.len());
        for parent_table in &parent_tables {
            let parent = self.mangler.demangle(parent_table);
            bases.push(self.load_at(&parent, path)?);
        }
        path.pop();

        let mut inherited = HashSet::new();
        for parent_table in &parent_tables {
            for column in introspector.list_columns(parent_table)? {
                inherited.insert(column.name);
            }
        }

        // Redeclared inherited columns are recorded as the concept declared them
        let mut declared: BTreeMap<String, DeclaredAttribute> = introspector
            .list_declared_attributes(table)?
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();

        let mut attributes = BTreeMap::new();
        for column in introspector.list_columns(table)? {
            if column.name == IDENTITY_COLUMN {
                continue;
            }
            let own = declared.remove(&column.name);
            if own.is_none() && inherited.contains(&column.name) {
                continue;
            }

            match self.translator.domain_from_column(name, &column.name, &column.column_type) {
                Ok(domain) => {
                    let (required, default) = match own {
                        Some(d) => (d.required, d.default),
                        None => (column.required, column.default),
                    };
                    attributes.insert(column.name, Attribute { domain, required, default });
                }
                Err(e) => self.sink.report(&e.with_context(ContextEntry::Table(table.clone()))),
            }
        }

        let mut links = BTreeMap::new();
        for row in introspector.list_links_by_source(name)? {
            let link = row.to_link()?;
            links.insert(link.outbound_key(), link);
        }

        let mut rlinks = BTreeMap::new();
        for row in introspector.list_links_by_target(name)? {
            let link = row.to_link()?;
            rlinks.insert(link.inbound_key(), link);
        }

        Ok(Concept {
            name: name.to_string(),
            parents: bases.iter().map(|b| b.name.clone()).collect(),
            attributes,
            links,
            rlinks,
            bases,
        })
    }

    // ========== Store ==========

    /// Persist a concept.
    ///
    /// `Full` and `Structure` are no-ops for a concept that already exists;
    /// `Links` always runs and registers the links not yet recorded.
    pub fn store(&mut self, concept: &Concept, phase: Phase) -> Result<()> {
        self.store_phase(concept, phase)
            .context_entry(|| ContextEntry::Phase(phase))
            .context_entry(|| ContextEntry::Concept(concept.name.clone()))
    }

    fn store_phase(&mut self, concept: &Concept, phase: Phase) -> Result<()> {
        if phase != Phase::Links && self.contains(&concept.name) {
            debug!("Concept {} already exists, skipping {} store", concept.name, phase);
            return Ok(());
        }

        if phase.runs_structure() {
            self.create_structure(concept)?;
        }
        if phase.runs_links() {
            self.register_links(concept)?;
        }
        Ok(())
    }

    /// Store a batch of concepts in two passes: every structure first, then
    /// every link. Parents within the batch are created before children.
    pub fn synchronize_batch(&mut self, concepts: &[Concept]) -> Result<()> {
        for concept in structure_order(concepts)? {
            self.store(concept, Phase::Structure)?;
        }
        for concept in concepts {
            self.store(concept, Phase::Links)?;
        }
        info!("Synchronized batch of {} concepts", concepts.len());
        Ok(())
    }

    fn create_structure(&mut self, concept: &Concept) -> Result<()> {
        validate_identifier(&concept.name)?;
        for attribute in concept.attributes.keys() {
            validate_identifier(attribute)?;
            if attribute == IDENTITY_COLUMN {
                return Err(Error::ReservedAttribute {
                    concept: concept.name.clone(),
                    attribute: attribute.clone(),
                });
            }
        }

        let columns = self.plan_columns(concept)?;
        let ddl = self.create_table_sql(concept, &columns);
        let table = self.mangler.table_name(&concept.name);
        let parent_tables: Vec<String> = concept
            .parents
            .iter()
            .map(|p| self.mangler.table_name(p))
            .collect();
        let namespace = self.mangler.namespace().to_string();

        debug!("{}", ddl);
        let tx = self.conn.transaction()?;
        tx.execute(&ddl, []).map_err(|e| Error::StructureConflict {
            concept: concept.name.clone(),
            reason: e.to_string(),
        })?;
        ConceptTable::insert(&tx, &namespace, &concept.name)?;
        InheritanceTable::insert(&tx, &namespace, &table, &parent_tables)?;
        AttributeTable::insert(&tx, &namespace, &table, &concept.attributes)?;
        tx.commit()?;

        info!("Created table {} for concept {}", self.mangler.mangle(&concept.name, false), concept.name);
        self.concepts.insert(concept.name.clone(), table);
        Ok(())
    }

    /// Inherited columns in parent order, then own attributes by name
    fn plan_columns(&self, concept: &Concept) -> Result<Vec<ColumnDef>> {
        let introspector = Introspector::new(&self.conn, &self.mangler);
        let mut columns = Vec::new();

        for parent in &concept.parents {
            validate_identifier(parent)?;
            let parent_table = self.concepts.get(parent).ok_or_else(|| Error::StructureConflict {
                concept: concept.name.clone(),
                reason: format!("parent concept \"{}\" is not defined", parent),
            })?;

            for column in introspector.list_columns(parent_table)? {
                if column.name != IDENTITY_COLUMN {
                    merge_column(&mut columns, column.into(), &concept.name)?;
                }
            }
        }

        for (name, attribute) in &concept.attributes {
            let column = ColumnDef {
                name: name.clone(),
                column_type: self.translator.column_type(&attribute.domain),
                required: attribute.required,
                default: attribute.default.clone(),
            };
            merge_column(&mut columns, column, &concept.name)?;
        }

        Ok(columns)
    }

    fn create_table_sql(&self, concept: &Concept, columns: &[ColumnDef]) -> String {
        let mut defs = vec![format!(
            "{} INTEGER NOT NULL REFERENCES entity(id) ON DELETE CASCADE",
            IDENTITY_COLUMN
        )];

        for column in columns {
            let mut def = format!("\"{}\" {}", column.name, column.column_type);
            if column.required {
                def.push_str(" NOT NULL");
            }
            if let Some(default) = &column.default {
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            defs.push(def);
        }

        format!(
            "CREATE TABLE {} ({})",
            self.mangler.mangle(&concept.name, true),
            defs.join(", ")
        )
    }

    /// Register every link of `concept` not yet in the concept-link registry.
    ///
    /// Each insert commits on its own; a failing link leaves the links
    /// registered before it in place.
    fn register_links(&self, concept: &Concept) -> Result<()> {
        let introspector = Introspector::new(&self.conn, &self.mangler);
        let registered: HashSet<(String, String)> = introspector
            .list_links_by_source(&concept.name)?
            .into_iter()
            .map(|row| (row.link_type, row.target))
            .collect();

        for link in concept.links.values() {
            if registered.contains(&(link.link_type.clone(), link.target.clone())) {
                debug!("Link {} {} -> {} already registered", link.link_type, link.source, link.target);
                continue;
            }

            let id = ConceptMapTable::insert(&self.conn, self.mangler.namespace(), link)
                .context_entry(|| ContextEntry::Link {
                    link_type: link.link_type.clone(),
                    target: link.target.clone(),
                })?;
            info!("Registered link {} {} -> {} ({}) as #{}", link.link_type, link.source, link.target, link.mapping, id);
        }
        Ok(())
    }

    // ========== Iteration ==========

    /// Lazily load every concept of the snapshot, in snapshot order
    pub fn iter(&self) -> ConceptIter<'_> {
        ConceptIter {
            engine: self,
            names: self.concepts.keys().cloned().collect::<Vec<_>>().into_iter(),
        }
    }
}

/// Iterator over all known concepts, loading each on demand
pub struct ConceptIter<'a> {
    engine: &'a SyncEngine,
    names: std::vec::IntoIter<String>,
}

impl Iterator for ConceptIter<'_> {
    type Item = Result<Concept>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        Some(self.engine.load(&name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

fn snapshot(conn: &Connection, mangler: &NameMangler) -> Result<BTreeMap<String, String>> {
    let tables = Introspector::new(conn, mangler).list_managed_tables()?;
    Ok(tables
        .into_iter()
        .map(|table| (mangler.demangle(&table), table))
        .collect())
}

/// Add `column`, merging with a same-named column of the same type
fn merge_column(columns: &mut Vec<ColumnDef>, column: ColumnDef, concept: &str) -> Result<()> {
    match columns.iter_mut().find(|c| c.name == column.name) {
        Some(existing) if !existing.column_type.eq_ignore_ascii_case(&column.column_type) => {
            Err(Error::StructureConflict {
                concept: concept.to_string(),
                reason: format!(
                    "column \"{}\" is declared as both {} and {}",
                    column.name, existing.column_type, column.column_type
                ),
            })
        }
        Some(existing) => {
            existing.required |= column.required;
            if existing.default.is_none() {
                existing.default = column.default;
            }
            Ok(())
        }
        None => {
            columns.push(column);
            Ok(())
        }
    }
}

/// Order a batch so that parents inside the batch precede their children
fn structure_order(concepts: &[Concept]) -> Result<Vec<&Concept>> {
    let by_name: BTreeMap<&str, &Concept> = concepts.iter().map(|c| (c.name.as_str(), c)).collect();
    let mut ordered = Vec::with_capacity(concepts.len());
    let mut done = HashSet::new();
    let mut visiting = HashSet::new();

    fn visit<'c>(
        concept: &'c Concept,
        by_name: &BTreeMap<&str, &'c Concept>,
        done: &mut HashSet<String>,
        visiting: &mut HashSet<String>,
        ordered: &mut Vec<&'c Concept>,
    ) -> Result<()> {
        if done.contains(&concept.name) {
            return Ok(());
        }
        if !visiting.insert(concept.name.clone()) {
            return Err(Error::StructureConflict {
                concept: concept.name.clone(),
                reason: "inheritance cycle within batch".to_string(),
            });
        }
        for parent in &concept.parents {
            if let Some(&parent) = by_name.get(parent.as_str()) {
                visit(parent, by_name, done, visiting, ordered)?;
            }
        }
        visiting.remove(&concept.name);
        done.insert(concept.name.clone());
        ordered.push(concept);
        Ok(())
    }

    for concept in concepts {
        visit(concept, &by_name, &mut done, &mut visiting, &mut ordered)?;
    }
    Ok(ordered)
}
