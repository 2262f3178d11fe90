//! Listing of the archives in a destination folder

use super::naming::NamingScheme;
use super::types::BackupEntry;
use crate::config::BackupConfig;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// View of the archives in one destination folder
///
/// Nothing is cached: every call reads the directory again, so results
/// always reflect the latest create/restore.
#[derive(Debug, Clone)]
pub struct BackupCatalog {
    dest_folder: PathBuf,
    naming: NamingScheme,
    safety_name: String,
}

impl BackupCatalog {
    /// Create a catalog for `dest_folder`
    pub fn new(
        dest_folder: impl Into<PathBuf>,
        naming: NamingScheme,
        safety_name: impl Into<String>,
    ) -> Self {
        Self {
            dest_folder: dest_folder.into(),
            naming,
            safety_name: safety_name.into(),
        }
    }

    /// Create a catalog for the destination folder of `config`
    #[must_use]
    pub fn from_config(config: &BackupConfig) -> Self {
        Self::new(&config.dest_folder, config.naming(), &config.safety_backup)
    }

    /// Folder being listed
    #[must_use]
    pub fn dest_folder(&self) -> &Path {
        &self.dest_folder
    }

    /// Naming scheme used to recognise archives
    #[must_use]
    pub fn naming(&self) -> &NamingScheme {
        &self.naming
    }

    /// Full path of an archive in the destination folder
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dest_folder.join(name)
    }

    /// Whether the safety backup currently exists
    #[must_use]
    pub fn has_safety_backup(&self) -> bool {
        self.path_of(&self.safety_name).is_file()
    }

    /// Archive names, newest first, safety backup (if present) on top
    ///
    /// A missing or unreadable destination folder yields an empty list.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dest_folder) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    debug!("Backup folder {} does not exist yet", self.dest_folder.display());
                } else {
                    warn!("Cannot list {}: {e}", self.dest_folder.display());
                }
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| *name != self.safety_name && self.naming.matches(name))
            .collect();
        names.sort_by(|a, b| b.cmp(a));

        if self.has_safety_backup() {
            names.insert(0, self.safety_name.clone());
        }
        names
    }

    /// Archive with the highest version
    ///
    /// Returns the naming scheme's sentinel (`{prefix}-1{ext}`) when there is
    /// none, so that `next()` on the result is always the name to create.
    #[must_use]
    pub fn highest(&self) -> String {
        let mut highest = self.naming.sentinel();
        let mut highest_version = -1;

        for name in self.list() {
            if name == self.safety_name {
                continue;
            }
            match self.naming.parse(&name) {
                Ok(version) if version > highest_version => {
                    highest_version = version;
                    highest = name;
                }
                Ok(_) => {}
                Err(e) => warn!("Ignoring {name}: {e}"),
            }
        }

        highest
    }

    /// Archives with file metadata, in [`list`](Self::list) order
    #[must_use]
    pub fn entries(&self) -> Vec<BackupEntry> {
        self.list()
            .into_iter()
            .map(|name| {
                let path = self.path_of(&name);
                let metadata = std::fs::metadata(&path).ok();
                let is_safety = name == self.safety_name;
                BackupEntry {
                    version: if is_safety {
                        None
                    } else {
                        self.naming.parse(&name).ok()
                    },
                    size: metadata.as_ref().map_or(0, std::fs::Metadata::len),
                    modified: metadata
                        .and_then(|m| m.modified().ok())
                        .map(OffsetDateTime::from),
                    is_safety,
                    path,
                    name,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn catalog(dir: &Path) -> BackupCatalog {
        BackupCatalog::new(dir, NamingScheme::new("BACKUP_", ".7z"), "SAFETY_BACKUP.7z")
    }

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"x").unwrap();
        }
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let temp = tempdir().unwrap();
        let catalog = catalog(&temp.path().join("missing"));
        assert!(catalog.list().is_empty());
        assert_eq!(catalog.highest(), "BACKUP_-1.7z");
    }

    #[test]
    fn test_list_filters_and_sorts_descending() {
        let temp = tempdir().unwrap();
        touch(
            temp.path(),
            &[
                "BACKUP_000.7z",
                "BACKUP_002.7Z",
                "BACKUP_001.7z",
                "BACKUP_003.zip",
                "OTHER_004.7z",
                "notes.txt",
            ],
        );
        fs::create_dir(temp.path().join("BACKUP_999.7z")).unwrap();

        assert_eq!(
            catalog(temp.path()).list(),
            vec!["BACKUP_002.7Z", "BACKUP_001.7z", "BACKUP_000.7z"]
        );
    }

    #[test]
    fn test_safety_backup_always_first() {
        let temp = tempdir().unwrap();
        touch(temp.path(), &["BACKUP_001.7z", "BACKUP_000.7z", "SAFETY_BACKUP.7z"]);

        let list = catalog(temp.path()).list();
        assert_eq!(list, vec!["SAFETY_BACKUP.7z", "BACKUP_001.7z", "BACKUP_000.7z"]);
    }

    #[test]
    fn test_safety_backup_matching_pattern_listed_once() {
        let temp = tempdir().unwrap();
        touch(temp.path(), &["BACKUP_000.7z", "BACKUP_SAFETY.7z"]);
        let catalog = BackupCatalog::new(
            temp.path(),
            NamingScheme::new("BACKUP_", ".7z"),
            "BACKUP_SAFETY.7z",
        );

        assert_eq!(catalog.list(), vec!["BACKUP_SAFETY.7z", "BACKUP_000.7z"]);
        assert_eq!(catalog.highest(), "BACKUP_000.7z");
    }

    #[test]
    fn test_highest_ignores_safety_and_compares_numerically() {
        let temp = tempdir().unwrap();
        touch(
            temp.path(),
            &["BACKUP_9.7z", "BACKUP_010.7z", "BACKUP_latest.7z", "SAFETY_BACKUP.7z"],
        );

        assert_eq!(catalog(temp.path()).highest(), "BACKUP_010.7z");
    }

    #[test]
    fn test_highest_accepts_version_zero() {
        let temp = tempdir().unwrap();
        touch(temp.path(), &["BACKUP_000.7z"]);
        assert_eq!(catalog(temp.path()).highest(), "BACKUP_000.7z");
    }

    #[test]
    fn test_list_is_idempotent() {
        let temp = tempdir().unwrap();
        touch(temp.path(), &["BACKUP_000.7z", "BACKUP_001.7z", "SAFETY_BACKUP.7z"]);
        let catalog = catalog(temp.path());
        assert_eq!(catalog.list(), catalog.list());
    }

    #[test]
    fn test_entries_carry_metadata() {
        let temp = tempdir().unwrap();
        touch(temp.path(), &["BACKUP_004.7z", "SAFETY_BACKUP.7z"]);

        let entries = catalog(temp.path()).entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_safety);
        assert_eq!(entries[0].version, None);
        assert_eq!(entries[1].version, Some(4));
        assert_eq!(entries[1].size, 1);
        assert!(entries[1].modified.is_some());
        assert_eq!(entries[1].path, temp.path().join("BACKUP_004.7z"));
    }
}
