use crate::error::{ArchivumError, Result};
use crate::snapshot::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for archivum, stored in `<root>/config.json`.
///
/// Relative paths are resolved against the data root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchivumConfig {
    /// Live database file
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    /// Directory holding the `sp<N>.db` snapshot ring
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// Root folder of uploaded files, one sub folder per archive
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,

    /// Published tab-separated manifest
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,

    /// Snapshots kept before the oldest is evicted
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,

    /// Leading discriminator of generated source ids
    #[serde(default = "default_node_id")]
    pub node_id: u8,
}

fn default_database_file() -> PathBuf {
    PathBuf::from("data.db")
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("backups")
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("sources.tsv")
}

fn default_max_snapshots() -> usize {
    DEFAULT_LIMIT
}

fn default_node_id() -> u8 {
    1
}

impl Default for ArchivumConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            backup_dir: default_backup_dir(),
            uploads_dir: default_uploads_dir(),
            manifest_file: default_manifest_file(),
            max_snapshots: default_max_snapshots(),
            node_id: default_node_id(),
        }
    }
}

impl ArchivumConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(ArchivumError::Io)?;
        let config: ArchivumConfig =
            serde_json::from_str(&content).map_err(ArchivumError::Serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(ArchivumError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(ArchivumError::Serialization)?;
        fs::write(config_path, content).map_err(ArchivumError::Io)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_snapshots == 0 {
            return Err(ArchivumError::Config(
                "max_snapshots must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve every configured path against `root`.
    pub fn resolve(&self, root: &Path) -> ArchivumPaths {
        ArchivumPaths {
            root: root.to_path_buf(),
            database: root.join(&self.database_file),
            backups: root.join(&self.backup_dir),
            uploads: root.join(&self.uploads_dir),
            manifest: root.join(&self.manifest_file),
        }
    }
}

/// Absolute locations of everything archivum keeps on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivumPaths {
    pub root: PathBuf,
    pub database: PathBuf,
    pub backups: PathBuf,
    pub uploads: PathBuf,
    pub manifest: PathBuf,
}

impl ArchivumPaths {
    /// Folder holding the files of one archive.
    pub fn archive_dir(&self, archive: &str) -> PathBuf {
        self.uploads.join(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchivumConfig::default();
        assert_eq!(config.max_snapshots, 10);
        assert_eq!(config.database_file, PathBuf::from("data.db"));
        assert_eq!(config.node_id, 1);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ArchivumConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, ArchivumConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ArchivumConfig {
            max_snapshots: 4,
            node_id: 7,
            ..ArchivumConfig::default()
        };
        config.save(temp_dir.path().join("nested")).unwrap();

        let loaded = ArchivumConfig::load(temp_dir.path().join("nested")).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{ "manifest_file": "public/list.tsv" }"#,
        )
        .unwrap();

        let loaded = ArchivumConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.manifest_file, PathBuf::from("public/list.tsv"));
        assert_eq!(loaded.max_snapshots, 10);
    }

    #[test]
    fn test_zero_snapshots_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{ "max_snapshots": 0 }"#,
        )
        .unwrap();

        let result = ArchivumConfig::load(temp_dir.path());
        assert!(matches!(result, Err(ArchivumError::Config(_))));
    }

    #[test]
    fn test_resolve_joins_root() {
        let paths = ArchivumConfig::default().resolve(Path::new("/srv/archivum"));
        assert_eq!(paths.database, PathBuf::from("/srv/archivum/data.db"));
        assert_eq!(paths.backups, PathBuf::from("/srv/archivum/backups"));
        assert_eq!(
            paths.archive_dir("demo"),
            PathBuf::from("/srv/archivum/uploads/demo")
        );
    }
}
