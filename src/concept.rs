//! Concept types - the abstract type model
//!
//! A concept is a named type with:
//! - `attributes`: typed scalar slots, one storage column each
//! - `links`: outbound link types keyed by `(link_type, target)`
//! - `rlinks`: inbound link types keyed by `(link_type, source)`
//! - `parents`: ordered parent concept names (multiple inheritance)

use std::collections::BTreeMap;
use crate::domain::Domain;
use crate::link::Link;

/// Name of the reserved identity column present in every concept table
pub const IDENTITY_COLUMN: &str = "entity_id";

/// A typed attribute of a concept
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    pub domain: Domain,
    /// Maps to a NOT NULL constraint
    pub required: bool,
    /// Default value as an SQL literal, e.g. `'anonymous'` or `0`
    pub default: Option<String>,
}

impl Attribute {
    pub fn new(domain: Domain, required: bool) -> Self {
        Self {
            domain,
            required,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A concept definition.
///
/// Fresh definitions name their parents in `parents`. Concepts produced by
/// `SyncEngine::load` additionally carry the loaded parent concepts in
/// `bases`, in the same order.
#[derive(Debug, Clone, Default)]
pub struct Concept {
    pub name: String,
    pub parents: Vec<String>,
    pub attributes: BTreeMap<String, Attribute>,
    pub links: BTreeMap<(String, String), Link>,
    pub rlinks: BTreeMap<(String, String), Link>,
    pub bases: Vec<Concept>,
}

impl Concept {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        let parent = parent.into();
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Add an outbound link; the link's source is this concept
    pub fn with_link(mut self, link: Link) -> Self {
        self.add_link(link);
        self
    }

    pub fn add_link(&mut self, mut link: Link) {
        link.source = self.name.clone();
        self.links.insert(link.outbound_key(), link);
    }

    /// Own and inherited attributes merged into one map.
    ///
    /// Bases are merged in declaration order, each with its own ancestors
    /// first; own attributes win over inherited ones of the same name.
    pub fn all_attributes(&self) -> BTreeMap<String, Attribute> {
        let mut merged = BTreeMap::new();
        for base in &self.bases {
            for (name, attr) in base.all_attributes() {
                merged.entry(name).or_insert(attr);
            }
        }
        for (name, attr) in &self.attributes {
            merged.insert(name.clone(), attr.clone());
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScalarType;
    use crate::link::Mapping;

    fn text(concept: &str, attr: &str) -> Attribute {
        Attribute::new(Domain::for_attribute(concept, attr, ScalarType::Text), false)
    }

    #[test]
    fn test_with_link_sets_source() {
        let concept = Concept::new("Person")
            .with_link(Link::new("", "Person", "knows", Mapping::ManyToMany));

        let link = &concept.links[&("knows".to_string(), "Person".to_string())];
        assert_eq!(link.source, "Person");
    }

    #[test]
    fn test_parents_are_a_set() {
        let concept = Concept::new("Derived").with_parent("Base").with_parent("Base");
        assert_eq!(concept.parents, vec!["Base".to_string()]);
    }

    #[test]
    fn test_all_attributes_merges_bases() {
        let root = Concept::new("Root").with_attribute("id_code", text("Root", "id_code"));

        let mut base = Concept::new("Base").with_attribute("title", text("Base", "title"));
        base.bases = vec![root];

        let mut derived = Concept::new("Derived")
            .with_attribute("title", Attribute::new(Domain::for_attribute("Derived", "title", ScalarType::Text), true))
            .with_attribute("body", text("Derived", "body"));
        derived.bases = vec![base];

        let all = derived.all_attributes();
        assert_eq!(all.len(), 3);
        assert!(all.contains_key("id_code"));
        assert!(all["title"].required);
    }
}
