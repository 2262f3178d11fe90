//! Backup configuration

use crate::backup::NamingScheme;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Everything the backup engine needs to know about one managed folder
///
/// Serialized keys match the legacy uppercase settings files
/// (`FILE_EXT`, `SOURCE_FOLDER`, ...). Keys the engine does not
/// use are kept in [`extra`](Self::extra) and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Archive file suffix, including the dot (e.g. ".zip")
    #[serde(rename = "FILE_EXT")]
    pub file_ext: String,

    /// Fixed prefix shared by all managed archives (e.g. "BACKUP_")
    #[serde(rename = "FILE_NAME")]
    pub file_name: String,

    /// Folder that is snapshotted and restored
    #[serde(rename = "SOURCE_FOLDER")]
    pub source_folder: PathBuf,

    /// Folder holding all archives
    #[serde(rename = "DEST_FOLDER")]
    pub dest_folder: PathBuf,

    /// Fixed name of the pre-restore safety archive
    #[serde(rename = "SAFETY_BACKUP")]
    pub safety_backup: String,

    /// Whether restores take a safety backup first
    #[serde(rename = "MAKE_BACKUP", default = "default_true")]
    pub make_backup: bool,

    /// Executable associated with the source folder (empty = none)
    #[serde(rename = "APP_PATH", default)]
    pub app_path: PathBuf,

    /// Host-owned keys (window position, debug flags, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            file_ext: ".zip".into(),
            file_name: "BACKUP_".into(),
            source_folder: PathBuf::from("./"),
            dest_folder: PathBuf::from("./"),
            safety_backup: "SAFETY_BACKUP.zip".into(),
            make_backup: true,
            app_path: PathBuf::new(),
            extra: Map::new(),
        }
    }
}

impl BackupConfig {
    /// Create a new builder starting from the defaults
    ///
    /// # Example
    /// ```rust
    /// use savekeep::BackupConfig;
    ///
    /// let config = BackupConfig::builder()
    ///     .source_folder("/games/MyGame/saves")
    ///     .dest_folder("/backups/MyGame")
    ///     .file_ext(".7z")
    ///     .build();
    /// assert_eq!(config.safety_backup_path(), std::path::Path::new("/backups/MyGame/SAFETY_BACKUP.zip"));
    /// ```
    #[must_use]
    pub fn builder() -> BackupConfigBuilder {
        BackupConfigBuilder::default()
    }

    /// Naming scheme for versioned archives
    #[must_use]
    pub fn naming(&self) -> NamingScheme {
        NamingScheme::new(&self.file_name, &self.file_ext)
    }

    /// Full path of the safety backup archive
    #[must_use]
    pub fn safety_backup_path(&self) -> PathBuf {
        self.dest_folder.join(&self.safety_backup)
    }

    /// Full path of an archive in the destination folder
    #[must_use]
    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.dest_folder.join(name)
    }

    /// Associated executable, if one is configured
    #[must_use]
    pub fn app_path(&self) -> Option<&Path> {
        if self.app_path.as_os_str().is_empty() {
            None
        } else {
            Some(&self.app_path)
        }
    }

    /// Check that the naming fields are usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(Error::Config("FILE_NAME must not be empty".into()));
        }
        if self.file_ext.is_empty() {
            return Err(Error::Config("FILE_EXT must not be empty".into()));
        }
        if self.safety_backup.is_empty() {
            return Err(Error::Config("SAFETY_BACKUP must not be empty".into()));
        }
        if self.safety_backup.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "SAFETY_BACKUP must be a plain file name, got '{}'",
                self.safety_backup
            )));
        }
        Ok(())
    }
}

/// Builder for creating [`BackupConfig`] with a fluent API
#[derive(Debug, Clone, Default)]
pub struct BackupConfigBuilder {
    config: BackupConfig,
}

impl BackupConfigBuilder {
    /// Set the archive extension (e.g. ".zip")
    #[must_use]
    pub fn file_ext(mut self, ext: impl Into<String>) -> Self {
        self.config.file_ext = ext.into();
        self
    }

    /// Set the archive filename prefix (e.g. "BACKUP_")
    #[must_use]
    pub fn file_name(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_name = prefix.into();
        self
    }

    /// Set the folder to back up
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn source_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source_folder = expand_home(path.into());
        self
    }

    /// Set the folder archives are written to
    ///
    /// Supports `~` expansion for home directory.
    #[must_use]
    pub fn dest_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dest_folder = expand_home(path.into());
        self
    }

    /// Set the safety backup file name
    #[must_use]
    pub fn safety_backup(mut self, name: impl Into<String>) -> Self {
        self.config.safety_backup = name.into();
        self
    }

    /// Set whether restores take a safety backup first
    #[must_use]
    pub fn make_backup(mut self, enabled: bool) -> Self {
        self.config.make_backup = enabled;
        self
    }

    /// Set the executable associated with the source folder
    #[must_use]
    pub fn app_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.app_path = expand_home(path.into());
        self
    }

    /// Build the config
    #[must_use]
    pub fn build(self) -> BackupConfig {
        self.config
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}
