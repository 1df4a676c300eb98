//! Physical names for concepts
//!
//! A concept `Person` in namespace `caos` is stored in table `Person_data`,
//! referenced as `caos.Person_data` or, inside DDL, `"caos"."Person_data"`.

use std::sync::OnceLock;
use regex::Regex;
use crate::{Error, Result};

/// Suffix appended to a concept name to form its table name
pub const TABLE_SUFFIX: &str = "_data";

/// Default namespace (SQLite schema) holding all managed tables
pub const DEFAULT_NAMESPACE: &str = "caos";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"))
}

/// Check that `name` can be embedded in DDL as an identifier
pub fn validate_identifier(name: &str) -> Result<()> {
    if identifier_re().is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(format!("\"{}\" is not a valid identifier", name)))
    }
}

/// Maps logical concept names to physical table names and back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMangler {
    namespace: String,
}

impl NameMangler {
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        validate_identifier(&namespace)?;
        Ok(Self { namespace })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Unqualified table name, e.g. `Person_data`
    pub fn table_name(&self, name: &str) -> String {
        format!("{}{}", name, TABLE_SUFFIX)
    }

    /// Schema-qualified table name; quoted for embedding in DDL
    pub fn mangle(&self, name: &str, quoted: bool) -> String {
        if quoted {
            format!("\"{}\".\"{}{}\"", self.namespace, name, TABLE_SUFFIX)
        } else {
            format!("{}.{}{}", self.namespace, name, TABLE_SUFFIX)
        }
    }

    /// Recover the logical name from a physical table name.
    ///
    /// Accepts bare, plain-qualified and quoted-qualified names. Names
    /// without the suffix are returned unchanged.
    pub fn demangle(&self, physical: &str) -> String {
        let quoted_prefix = format!("\"{}\".", self.namespace);
        let plain_prefix = format!("{}.", self.namespace);

        let unqualified = physical
            .strip_prefix(&quoted_prefix)
            .or_else(|| physical.strip_prefix(&plain_prefix))
            .unwrap_or(physical);

        let unquoted = unqualified
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(unqualified);

        unquoted
            .strip_suffix(TABLE_SUFFIX)
            .unwrap_or(unquoted)
            .to_string()
    }

    /// Quote a catalog table name in this namespace, e.g. `"caos"."concept"`
    pub fn qualify(&self, table: &str) -> String {
        format!("\"{}\".\"{}\"", self.namespace, table)
    }
}

impl Default for NameMangler {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mangle_forms() {
        let mangler = NameMangler::default();
        assert_eq!(mangler.mangle("Person", false), "caos.Person_data");
        assert_eq!(mangler.mangle("Person", true), "\"caos\".\"Person_data\"");
        assert_eq!(mangler.table_name("Person"), "Person_data");
    }

    #[test]
    fn test_demangle_is_left_inverse() {
        let mangler = NameMangler::new("meta").unwrap();
        for name in ["Person", "order_item", "_x", "data", "Thing_data"] {
            assert_eq!(mangler.demangle(&mangler.mangle(name, true)), name);
            assert_eq!(mangler.demangle(&mangler.mangle(name, false)), name);
            assert_eq!(mangler.demangle(&mangler.table_name(name)), name);
        }
    }

    #[test]
    fn test_demangle_without_suffix() {
        let mangler = NameMangler::default();
        assert_eq!(mangler.demangle("concept"), "concept");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("Person").is_ok());
        assert!(validate_identifier("person_2").is_ok());
        assert!(validate_identifier("2person").is_err());
        assert!(validate_identifier("bad\"name").is_err());
        assert!(validate_identifier("").is_err());
        assert!(NameMangler::new("no-dash").is_err());
    }
}
