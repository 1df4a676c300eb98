//! # ConceptDB - Concept catalog over a relational store
//!
//! Keeps an abstract object-graph type model in sync with the relational
//! schema that stores its instances.
//!
//! ConceptDB provides:
//! - A concept model: named types with typed attributes, cardinality-tagged
//!   links and multiple inheritance
//! - Catalog tables recording concepts, link types and entity edges
//! - Schema introspection over the physical catalog
//! - A synchronization engine that materializes concepts as tables and
//!   reconstructs concepts from existing tables

pub mod concept;
pub mod link;
pub mod domain;
pub mod naming;
pub mod storage;
pub mod sync;
pub mod sink;
pub mod definition;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use concept::{Attribute, Concept};
pub use link::{Link, Mapping};
pub use domain::{Domain, DomainTranslator, ScalarType, SqliteTypeTranslator};
pub use naming::NameMangler;
pub use sink::{ErrorSink, TracingSink};
pub use sync::{Phase, SyncEngine};

use std::fmt;

/// Result type alias for ConceptDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for ConceptDB operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reference to an undefined concept \"{0}\"")]
    UndefinedConcept(String),

    #[error("cannot translate column \"{column}\" of type {column_type}: {reason}")]
    AttributeTranslation {
        column: String,
        column_type: String,
        reason: String,
    },

    #[error("cannot resolve link \"{link_type}\" from \"{from}\" to \"{to}\"")]
    LinkResolution {
        from: String,
        to: String,
        link_type: String,
        #[source]
        cause: rusqlite::Error,
    },

    #[error("cannot create structure for concept \"{concept}\": {reason}")]
    StructureConflict { concept: String, reason: String },

    #[error("unknown scalar type \"{0}\"")]
    UnknownScalarType(String),

    #[error("corrupt schema: {0}")]
    CorruptSchema(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("attribute \"{attribute}\" of concept \"{concept}\" uses the reserved identity column name")]
    ReservedAttribute { concept: String, attribute: String },

    #[error("failed to initialize catalog table \"{table}\"")]
    Initialization {
        table: &'static str,
        #[source]
        cause: rusqlite::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("{inner} ({trail})")]
    Context {
        trail: ContextTrail,
        #[source]
        inner: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with one more context entry.
    ///
    /// An error that already carries context gets the entry appended to its
    /// trail; anything else is wrapped in a fresh `Context`.
    pub fn with_context(self, entry: ContextEntry) -> Error {
        match self {
            Error::Context { mut trail, inner } => {
                trail.0.push(entry);
                Error::Context { trail, inner }
            }
            other => Error::Context {
                trail: ContextTrail(vec![entry]),
                inner: Box::new(other),
            },
        }
    }

    /// The underlying error kind, looking through context wrappers
    pub fn root(&self) -> &Error {
        match self {
            Error::Context { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Context entries attached to this error, innermost first
    pub fn context(&self) -> &[ContextEntry] {
        match self {
            Error::Context { trail, .. } => &trail.0,
            _ => &[],
        }
    }
}

/// A structured piece of context attached to an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEntry {
    Concept(String),
    Phase(Phase),
    Table(String),
    Link { link_type: String, target: String },
}

impl fmt::Display for ContextEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextEntry::Concept(name) => write!(f, "concept={}", name),
            ContextEntry::Phase(phase) => write!(f, "phase={}", phase),
            ContextEntry::Table(name) => write!(f, "table={}", name),
            ContextEntry::Link { link_type, target } => write!(f, "link={}->{}", link_type, target),
        }
    }
}

/// Ordered list of context entries carried by `Error::Context`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextTrail(pub Vec<ContextEntry>);

impl fmt::Display for ContextTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Attach context to the error side of a `Result`
pub trait ResultExt<T> {
    fn context_entry(self, entry: impl FnOnce() -> ContextEntry) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context_entry(self, entry: impl FnOnce() -> ContextEntry) -> Result<T> {
        self.map_err(|e| e.with_context(entry()))
    }
}
