//! Link types - typed relationships between concepts
//!
//! A link is a directed relationship class from a source concept to a target
//! concept, tagged with a two-character cardinality code:
//! - `11`: one-to-one
//! - `1*`: one-to-many
//! - `*1`: many-to-one
//! - `**`: many-to-many

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Cardinality of a link, stored as a 2-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mapping {
    #[serde(rename = "11")]
    OneToOne,
    #[serde(rename = "1*")]
    OneToMany,
    #[serde(rename = "*1")]
    ManyToOne,
    #[serde(rename = "**")]
    ManyToMany,
}

impl Mapping {
    /// Get the stored code of the mapping
    pub fn as_str(&self) -> &'static str {
        match self {
            Mapping::OneToOne => "11",
            Mapping::OneToMany => "1*",
            Mapping::ManyToOne => "*1",
            Mapping::ManyToMany => "**",
        }
    }

    /// Get all mappings
    pub fn all() -> &'static [Mapping] {
        &[
            Mapping::OneToOne,
            Mapping::OneToMany,
            Mapping::ManyToOne,
            Mapping::ManyToMany,
        ]
    }
}

impl FromStr for Mapping {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "11" => Ok(Mapping::OneToOne),
            "1*" => Ok(Mapping::OneToMany),
            "*1" => Ok(Mapping::ManyToOne),
            "**" => Ok(Mapping::ManyToMany),
            _ => Err(crate::Error::CorruptSchema(format!("unknown link mapping: {}", s))),
        }
    }
}

impl std::fmt::Display for Mapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A link type between two concepts.
///
/// Owned by the source concept's `links` and mirrored in the target
/// concept's `rlinks`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Source concept name
    pub source: String,
    /// Target concept name
    pub target: String,
    /// Link type identifier
    pub link_type: String,
    /// Cardinality
    pub mapping: Mapping,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        link_type: impl Into<String>,
        mapping: Mapping,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            link_type: link_type.into(),
            mapping,
        }
    }

    /// Key of this link in the source concept's `links`
    pub fn outbound_key(&self) -> (String, String) {
        (self.link_type.clone(), self.target.clone())
    }

    /// Key of this link in the target concept's `rlinks`
    pub fn inbound_key(&self) -> (String, String) {
        (self.link_type.clone(), self.source.clone())
    }
}
