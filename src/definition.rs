//! Concept definition files
//!
//! A definition file lists concepts in TOML:
//!
//! ```toml
//! [[concept]]
//! name = "Person"
//! parents = ["Named"]
//!
//! [concept.attributes.age]
//! domain = "integer"
//! required = true
//! default = "0"
//!
//! [[concept.links]]
//! link_type = "knows"
//! target = "Person"
//! mapping = "**"
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::concept::{Attribute, Concept};
use crate::domain::{Domain, ScalarType};
use crate::link::{Link, Mapping};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefinitionFile {
    #[serde(default, rename = "concept")]
    pub concepts: Vec<ConceptDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptDef {
    pub name: String,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    pub domain: ScalarType,
    #[serde(default)]
    pub required: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDef {
    pub link_type: String,
    pub target: String,
    pub mapping: Mapping,
}

impl ConceptDef {
    pub fn into_concept(self) -> Concept {
        let mut concept = Concept::new(&self.name);
        for parent in self.parents {
            concept = concept.with_parent(parent);
        }
        for (name, def) in self.attributes {
            let domain = Domain::for_attribute(&self.name, &name, def.domain);
            concept.attributes.insert(
                name,
                Attribute {
                    domain,
                    required: def.required,
                    default: def.default,
                },
            );
        }
        for link in self.links {
            concept.add_link(Link::new(&self.name, link.target, link.link_type, link.mapping));
        }
        concept
    }
}

impl DefinitionFile {
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn into_concepts(self) -> Vec<Concept> {
        self.concepts.into_iter().map(ConceptDef::into_concept).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[concept]]
name = "Named"

[concept.attributes.name]
domain = "text"
required = true
default = "'unnamed'"

[[concept]]
name = "Person"
parents = ["Named"]

[concept.attributes.age]
domain = "integer"

[[concept.links]]
link_type = "knows"
target = "Person"
mapping = "**"
"#;

    #[test]
    fn test_parse_definitions() {
        let concepts = DefinitionFile::parse(SAMPLE).unwrap().into_concepts();
        assert_eq!(concepts.len(), 2);

        let named = &concepts[0];
        let name = &named.attributes["name"];
        assert_eq!(name.domain, Domain::new("Named__name", ScalarType::Text));
        assert!(name.required);
        assert_eq!(name.default.as_deref(), Some("'unnamed'"));

        let person = &concepts[1];
        assert_eq!(person.parents, vec!["Named".to_string()]);
        assert!(!person.attributes["age"].required);
        let knows = &person.links[&("knows".to_string(), "Person".to_string())];
        assert_eq!(knows.source, "Person");
        assert_eq!(knows.mapping, Mapping::ManyToMany);
    }

    #[test]
    fn test_unknown_mapping_rejected() {
        let bad = r#"
[[concept]]
name = "A"
[[concept.links]]
link_type = "x"
target = "A"
mapping = "1?"
"#;
        assert!(DefinitionFile::parse(bad).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defs.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(DefinitionFile::load(&path).unwrap().concepts.len(), 2);
    }
}
