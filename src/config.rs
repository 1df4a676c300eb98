use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::naming::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConceptDbConfig {
    pub database: Option<String>,
    pub namespace: Option<String>,
}

impl ConceptDbConfig {
    /// Database path: explicit flag, then config, then the default
    pub fn resolve_database(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.database.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_database_path)
    }

    /// Namespace: explicit flag, then config, then the default
    pub fn resolve_namespace(&self, flag: Option<&str>) -> String {
        flag.map(str::to_string)
            .or_else(|| self.namespace.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("conceptdb.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("conceptdb.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ConceptDbConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ConceptDbConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ConceptDbConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conceptdb.toml");
        let config = ConceptDbConfig {
            database: Some("catalog.db".to_string()),
            namespace: Some("meta".to_string()),
        };
        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("catalog.db"));
        assert_eq!(loaded.resolve_namespace(None), "meta");
        assert_eq!(loaded.resolve_namespace(Some("other")), "other");
    }

    #[test]
    fn test_resolution_defaults() {
        let config = ConceptDbConfig::default();
        assert_eq!(config.resolve_database(None), default_database_path());
        assert_eq!(config.resolve_namespace(None), "caos");
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("conceptdb.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().exists());
    }
}
