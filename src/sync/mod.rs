//! Schema synchronization between concepts and physical tables
//!
//! - `load`: reconstruct a concept from its table, catalog rows and parents
//! - `store`: materialize a concept, split into a structure step and a
//!   links step so that mutually referencing concepts can be stored in two
//!   passes
//! - `iter`: lazily load every known concept

pub mod engine;

pub use engine::{ConceptIter, SyncEngine, MAX_INHERITANCE_DEPTH};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which half of the persistence protocol a `store` call performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Structure, then links
    Full,
    /// Table, concept registry row and inheritance rows
    Structure,
    /// Concept-link registry rows
    Links,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Full => "full",
            Phase::Structure => "structure",
            Phase::Links => "links",
        }
    }

    pub fn runs_structure(&self) -> bool {
        matches!(self, Phase::Full | Phase::Structure)
    }

    pub fn runs_links(&self) -> bool {
        matches!(self, Phase::Full | Phase::Links)
    }
}

impl FromStr for Phase {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "all" => Ok(Phase::Full),
            "structure" | "1" => Ok(Phase::Structure),
            "links" | "2" => Ok(Phase::Links),
            _ => Err(crate::Error::InvalidName(format!("unknown phase: {}", s))),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_steps() {
        assert!(Phase::Full.runs_structure() && Phase::Full.runs_links());
        assert!(Phase::Structure.runs_structure() && !Phase::Structure.runs_links());
        assert!(!Phase::Links.runs_structure() && Phase::Links.runs_links());
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("links".parse::<Phase>().unwrap(), Phase::Links);
        assert_eq!("1".parse::<Phase>().unwrap(), Phase::Structure);
        assert!("both".parse::<Phase>().is_err());
    }
}
