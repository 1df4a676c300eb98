//! Attribute domains and their storage column types
//!
//! A domain is a named scalar type. The translator maps a domain to the
//! column type used in DDL and maps introspected column types back.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Scalar base types an attribute domain can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Text,
    Integer,
    Float,
    Boolean,
    Bytes,
    Timestamp,
    Decimal,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Text => "text",
            ScalarType::Integer => "integer",
            ScalarType::Float => "float",
            ScalarType::Boolean => "boolean",
            ScalarType::Bytes => "bytes",
            ScalarType::Timestamp => "timestamp",
            ScalarType::Decimal => "decimal",
        }
    }
}

impl FromStr for ScalarType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "str" | "string" => Ok(ScalarType::Text),
            "integer" | "int" => Ok(ScalarType::Integer),
            "float" | "real" | "double" => Ok(ScalarType::Float),
            "boolean" | "bool" => Ok(ScalarType::Boolean),
            "bytes" | "blob" => Ok(ScalarType::Bytes),
            "timestamp" | "datetime" => Ok(ScalarType::Timestamp),
            "decimal" | "numeric" => Ok(ScalarType::Decimal),
            _ => Err(Error::UnknownScalarType(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named scalar domain.
///
/// Domains synthesized for a single attribute are named
/// `<concept>__<attribute>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub base: ScalarType,
}

impl Domain {
    pub fn new(name: impl Into<String>, base: ScalarType) -> Self {
        Self {
            name: name.into(),
            base,
        }
    }

    /// Domain synthesized for one attribute of one concept
    pub fn for_attribute(concept: &str, attribute: &str, base: ScalarType) -> Self {
        Self::new(format!("{}__{}", concept, attribute), base)
    }
}

/// Bidirectional translation between domains and storage column types
pub trait DomainTranslator: Send + Sync {
    /// Column type used when materializing an attribute of this domain
    fn column_type(&self, domain: &Domain) -> String;

    /// Reconstruct the domain of `column` of `concept` from its introspected
    /// type. The domain is named as by [`Domain::for_attribute`].
    fn domain_from_column(&self, concept: &str, column: &str, column_type: &str) -> Result<Domain>;
}

/// Translator for SQLite declared column types
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteTypeTranslator;

impl DomainTranslator for SqliteTypeTranslator {
    fn column_type(&self, domain: &Domain) -> String {
        match domain.base {
            ScalarType::Text => "TEXT",
            ScalarType::Integer => "INTEGER",
            ScalarType::Float => "REAL",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Bytes => "BLOB",
            ScalarType::Timestamp => "TIMESTAMP",
            ScalarType::Decimal => "NUMERIC",
        }
        .to_string()
    }

    fn domain_from_column(&self, concept: &str, column: &str, column_type: &str) -> Result<Domain> {
        // Declared types may carry a length or precision, e.g. VARCHAR(255)
        let upper = column_type.trim().to_uppercase();
        let base_name = upper.split('(').next().unwrap_or("").trim();

        let base = match base_name {
            "TEXT" | "VARCHAR" | "CHAR" | "CHARACTER" | "CLOB" | "NVARCHAR" => ScalarType::Text,
            "INTEGER" | "INT" | "BIGINT" | "SMALLINT" | "TINYINT" => ScalarType::Integer,
            "REAL" | "DOUBLE" | "FLOAT" | "DOUBLE PRECISION" => ScalarType::Float,
            "BOOLEAN" | "BOOL" => ScalarType::Boolean,
            "BLOB" | "BYTEA" => ScalarType::Bytes,
            "TIMESTAMP" | "DATETIME" => ScalarType::Timestamp,
            "NUMERIC" | "DECIMAL" => ScalarType::Decimal,
            _ => {
                return Err(Error::AttributeTranslation {
                    column: column.to_string(),
                    column_type: column_type.to_string(),
                    reason: "no domain maps to this column type".to_string(),
                });
            }
        };

        Ok(Domain::for_attribute(concept, column, base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_roundtrip() {
        let translator = SqliteTypeTranslator;
        for base in [
            ScalarType::Text,
            ScalarType::Integer,
            ScalarType::Float,
            ScalarType::Boolean,
            ScalarType::Bytes,
            ScalarType::Timestamp,
            ScalarType::Decimal,
        ] {
            let domain = Domain::for_attribute("Person", "field", base);
            let column_type = translator.column_type(&domain);
            let back = translator.domain_from_column("Person", "field", &column_type).unwrap();
            assert_eq!(back, domain);
        }
    }

    #[test]
    fn test_aliases() {
        let translator = SqliteTypeTranslator;
        let domain = translator.domain_from_column("X", "y", "varchar(255)").unwrap();
        assert_eq!(domain.base, ScalarType::Text);
        assert_eq!(domain.name, "X__y");
    }

    #[test]
    fn test_unknown_type() {
        let translator = SqliteTypeTranslator;
        let err = translator.domain_from_column("X", "shape", "GEOMETRY").unwrap_err();
        assert!(matches!(err, Error::AttributeTranslation { ref column, .. } if column == "shape"));
        assert!(err.to_string().contains("column \"shape\" of type GEOMETRY"));
    }

    #[test]
    fn test_scalar_parse() {
        assert_eq!("str".parse::<ScalarType>().unwrap(), ScalarType::Text);
        assert!(matches!("vector".parse::<ScalarType>(), Err(Error::UnknownScalarType(ref s)) if s == "vector"));
    }
}
