//! Restore logic
//!
//! A restore replaces the source folder with the contents of an archive:
//!
//! 1. **Safety backup** - snapshot the current folder so the restore can be undone
//! 2. **Delete** - remove the source folder
//! 3. **Extract** - recreate the folder and unpack the archive into its parent
//!
//! The archive is checked before step 1, so a missing or unreadable archive
//! never costs the user their current data.

use super::archive::{extract_zip_archive, inspect_zip_archive};
use super::snapshot::{SnapshotWriter, split_root};
use super::types::{
    ArchiveResult, RestoreOptions, RestorePolicy, RestoreResult, RestoreStage, StepPolicy,
};
use crate::error::{self, Error, Result};
use crate::events::BackupEvent;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Restores archives over a source folder
#[derive(Debug, Clone, Default)]
pub struct RestoreEngine {
    writer: SnapshotWriter,
    policy: RestorePolicy,
}

impl RestoreEngine {
    /// Create an engine with the default (best-effort) policy
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `writer` for safety backups
    #[must_use]
    pub fn with_writer(mut self, writer: SnapshotWriter) -> Self {
        self.writer = writer;
        self
    }

    /// Use `policy` for failing steps
    #[must_use]
    pub fn with_policy(mut self, policy: RestorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current failure policy
    #[must_use]
    pub fn policy(&self) -> RestorePolicy {
        self.policy
    }

    /// Restore `options.archive_path` over `options.source_folder`
    ///
    /// The archive is extracted into the parent of the source folder, so its
    /// top-level entry must carry the folder's name (which is how
    /// [`SnapshotWriter`] writes it).
    ///
    /// # Errors
    ///
    /// - [`Error::ArchiveNotFound`] if the archive does not exist (nothing is touched)
    /// - [`Error::Extract`] if verification is on and the archive is unreadable (nothing is touched)
    /// - [`Error::SafetyBackup`] / [`Error::Delete`] if that step fails under [`StepPolicy::FailFast`]
    /// - [`Error::Extract`] / [`Error::FileWrite`] if unpacking fails
    pub fn restore(
        &self,
        options: &RestoreOptions,
        on_event: &dyn Fn(&BackupEvent),
    ) -> Result<RestoreResult> {
        let start = Instant::now();
        let archive = options.archive_path.as_path();
        let source = options.source_folder.as_path();
        info!(
            "📥 Restoring {} into {}",
            archive.display(),
            source.display()
        );

        if !archive.is_file() {
            return Err(Error::ArchiveNotFound(archive.to_path_buf()));
        }
        // Delete and extract act on the resolved folder, so a symlinked
        // source keeps its link
        let (parent, folder_name) = split_root(source)?;
        let target = parent.join(&folder_name);

        if self.policy.verify_archive {
            let summary = inspect_zip_archive(archive)?;
            debug!(
                "Archive holds {} files under {:?}",
                summary.file_count, summary.roots
            );
            let folder_name = folder_name.to_string_lossy();
            if !summary.roots.contains(&*folder_name) {
                warn!(
                    "Archive {} has no '{folder_name}' root, contents land next to it",
                    archive.display()
                );
            }
        }

        let mut result = RestoreResult {
            archive_path: archive.to_path_buf(),
            ..Default::default()
        };

        // Stage 1: safety backup
        result.stage = RestoreStage::SafetyBackup;
        on_event(&BackupEvent::Stage(result.stage));
        if let Some(safety_path) = &options.safety_backup {
            if is_same_file(safety_path, archive) {
                let reason = "the archive being restored is the safety backup".to_string();
                warn!("Skipping safety backup: {reason}");
                on_event(&BackupEvent::SafetyBackupSkipped { reason });
            } else {
                match self.take_safety_backup(source, safety_path, on_event) {
                    Ok(snapshot) => result.safety_backup = Some(snapshot),
                    Err(e) => match self.policy.safety_backup {
                        StepPolicy::FailFast => return Err(Error::SafetyBackup(Box::new(e))),
                        StepPolicy::BestEffort => {
                            warn!("⚠️ Safety backup failed, continuing: {e}");
                            on_event(&BackupEvent::SafetyBackupFailed {
                                reason: e.to_string(),
                            });
                            result.warnings.push(format!("safety backup: {e}"));
                        }
                    },
                }
            }
        }

        // Stage 2: delete the current folder
        result.stage = RestoreStage::Deleting;
        on_event(&BackupEvent::Stage(result.stage));
        on_event(&BackupEvent::Deleting {
            path: target.clone(),
        });
        if let Err(e) = remove_tree(&target) {
            match self.policy.delete {
                StepPolicy::FailFast => return Err(e),
                StepPolicy::BestEffort => {
                    warn!("⚠️ Error deleting {}: {e}", target.display());
                    on_event(&BackupEvent::DeleteFailed {
                        path: target.clone(),
                        reason: e.to_string(),
                    });
                    result.warnings.push(format!("delete: {e}"));
                }
            }
        }

        // Stage 3: extract
        result.stage = RestoreStage::Extracting;
        on_event(&BackupEvent::Stage(result.stage));
        on_event(&BackupEvent::Extracting {
            archive: archive.to_path_buf(),
        });
        error::create_dir(&target)?;
        result.files_restored = extract_zip_archive(archive, &parent)?;

        result.stage = RestoreStage::Done;
        result.elapsed = start.elapsed();
        on_event(&BackupEvent::Stage(result.stage));
        on_event(&BackupEvent::Restored {
            archive: archive.to_path_buf(),
            elapsed: result.elapsed,
        });
        info!(
            "✅ Restored {} files from {} in {:.2}s",
            result.files_restored,
            archive.display(),
            result.elapsed.as_secs_f64()
        );
        Ok(result)
    }

    fn take_safety_backup(
        &self,
        source: &Path,
        safety_path: &Path,
        on_event: &dyn Fn(&BackupEvent),
    ) -> Result<ArchiveResult> {
        debug!("Taking safety backup at {}", safety_path.display());
        error::remove_file_if_exists(safety_path)?;
        error::create_dir(source)?;
        self.writer.create(source, safety_path, on_event)
    }
}

/// Remove a directory tree, treating "not found" as success
fn remove_tree(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Delete {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

// =============================================================================
// Tests
// =============================================================================
