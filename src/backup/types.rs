//! Backup/restore types

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;

/// Outcome of writing one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveResult {
    /// Where the archive was written
    pub archive_path: PathBuf,

    /// Number of files stored
    pub file_count: usize,

    /// Uncompressed size of all stored files in bytes
    pub total_bytes: u64,

    /// Size of the archive on disk in bytes
    pub archive_size: u64,

    /// SHA-256 checksum of the archive file (lowercase hex)
    pub sha256: String,

    /// Wall-clock time of the whole operation, staging included
    pub elapsed: Duration,
}

/// Outcome of a restore
#[derive(Debug, Clone, Default)]
pub struct RestoreResult {
    /// Archive that was restored
    pub archive_path: PathBuf,

    /// Wall-clock time of the whole operation
    pub elapsed: Duration,

    /// Number of files written back into the source folder
    pub files_restored: usize,

    /// Safety backup taken before the restore, if any
    pub safety_backup: Option<ArchiveResult>,

    /// Best-effort failures that were logged and skipped
    pub warnings: Vec<String>,

    /// Last stage reached
    pub stage: RestoreStage,
}

impl RestoreResult {
    /// True if no step had to be skipped
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Stages of the restore pipeline, in order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RestoreStage {
    #[default]
    Idle,
    SafetyBackup,
    Deleting,
    Extracting,
    Done,
}

impl fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SafetyBackup => "safety backup",
            Self::Deleting => "deleting",
            Self::Extracting => "extracting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// How a failing restore step is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepPolicy {
    /// Log the failure, record a warning and continue
    #[default]
    BestEffort,
    /// Abort the restore with the step's error
    FailFast,
}

/// Failure handling for the restore pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestorePolicy {
    /// Policy for the pre-restore safety backup
    pub safety_backup: StepPolicy,

    /// Policy for deleting the source folder
    pub delete: StepPolicy,

    /// Open the archive and read its index before deleting anything
    pub verify_archive: bool,
}

impl Default for RestorePolicy {
    fn default() -> Self {
        Self {
            safety_backup: StepPolicy::BestEffort,
            delete: StepPolicy::BestEffort,
            verify_archive: true,
        }
    }
}

impl RestorePolicy {
    /// Abort on any failing step
    #[must_use]
    pub fn strict() -> Self {
        Self {
            safety_backup: StepPolicy::FailFast,
            delete: StepPolicy::FailFast,
            verify_archive: true,
        }
    }

    /// Set the policy for the safety backup step
    #[must_use]
    pub fn safety_backup(mut self, policy: StepPolicy) -> Self {
        self.safety_backup = policy;
        self
    }

    /// Set the policy for the delete step
    #[must_use]
    pub fn delete(mut self, policy: StepPolicy) -> Self {
        self.delete = policy;
        self
    }

    /// Set whether the archive is checked before the source is deleted
    #[must_use]
    pub fn verify_archive(mut self, verify: bool) -> Self {
        self.verify_archive = verify;
        self
    }
}

/// Options for one restore
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Archive to restore
    pub archive_path: PathBuf,

    /// Folder that is replaced by the archive contents
    pub source_folder: PathBuf,

    /// Where to write a safety backup first (`None` = skip it)
    pub safety_backup: Option<PathBuf>,
}

impl RestoreOptions {
    /// Create restore options for an archive
    ///
    /// # Example
    /// ```rust
    /// use savekeep::RestoreOptions;
    ///
    /// let options = RestoreOptions::from_path("backups/BACKUP_003.zip")
    ///     .source_folder("saves")
    ///     .safety_backup("backups/SAFETY_BACKUP.zip");
    /// assert!(options.safety_backup.is_some());
    /// ```
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: path.into(),
            source_folder: PathBuf::from("."),
            safety_backup: None,
        }
    }

    /// Set the folder to restore into
    #[must_use]
    pub fn source_folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_folder = path.into();
        self
    }

    /// Take a safety backup at `path` before restoring
    #[must_use]
    pub fn safety_backup(mut self, path: impl Into<PathBuf>) -> Self {
        self.safety_backup = Some(path.into());
        self
    }

    /// Skip the safety backup
    #[must_use]
    pub fn no_safety_backup(mut self) -> Self {
        self.safety_backup = None;
        self
    }
}

/// One archive in the destination folder, with file metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupEntry {
    /// File name
    pub name: String,

    /// Full path
    pub path: PathBuf,

    /// Parsed version, `None` for the safety backup or unparseable names
    pub version: Option<i64>,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    #[serde(with = "time::serde::rfc3339::option")]
    pub modified: Option<OffsetDateTime>,

    /// Whether this is the safety backup
    pub is_safety: bool,
}
