//! Snapshot creation
//!
//! A snapshot is taken in three steps: the source tree is copied to a
//! private staging directory, the copy is compressed into the destination
//! archive, and the staging directory is removed. Compressing the copy
//! keeps the archive consistent while the live folder keeps changing.

use super::archive::{ArchiveStats, calculate_file_hash, create_zip_archive, sorted_walk};
use super::types::ArchiveResult;
use crate::error::{self, Error, Result};
use crate::events::BackupEvent;
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Prefix of staging directories in the temp folder
const STAGING_PREFIX: &str = "savekeep_";

/// Suffix appended to an archive while it is being written
const PARTIAL_SUFFIX: &str = ".partial";

/// Writes snapshot archives of a folder
#[derive(Debug, Clone, Default)]
pub struct SnapshotWriter {
    staging_root: Option<PathBuf>,
}

impl SnapshotWriter {
    /// Create a writer that stages in the system temp directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage copies under `path` instead of the system temp directory
    #[must_use]
    pub fn staging_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(path.into());
        self
    }

    /// Snapshot `source_folder` into a new archive at `dest_archive_path`
    ///
    /// Entries are stored as `basename(source_folder)/relative/path`. A
    /// [`BackupEvent::FileAdded`] is emitted per stored file.
    ///
    /// The archive is written next to its final location with a
    /// `.partial` suffix and renamed once complete, so a failed snapshot
    /// never leaves a truncated archive under a catalog name.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceMissing`] if `source_folder` is not a directory
    /// - [`Error::StageCopy`] if the staging copy fails
    /// - [`Error::ArchiveWrite`] if the archive cannot be written
    pub fn create(
        &self,
        source_folder: &Path,
        dest_archive_path: &Path,
        on_event: &dyn Fn(&BackupEvent),
    ) -> Result<ArchiveResult> {
        let start = Instant::now();
        info!(
            "📦 Creating snapshot of {} at {}",
            source_folder.display(),
            dest_archive_path.display()
        );
        on_event(&BackupEvent::SnapshotStarted {
            archive: dest_archive_path.to_path_buf(),
        });

        if !source_folder.is_dir() {
            return Err(Error::SourceMissing(source_folder.to_path_buf()));
        }
        let (_, root_name) = split_root(source_folder)?;
        let Some(root_name) = root_name.to_str().map(str::to_owned) else {
            return Err(Error::ArchiveWrite {
                path: dest_archive_path.to_path_buf(),
                reason: format!("'{}' is not a valid UTF-8 path", source_folder.display()),
            });
        };

        if let Some(parent) = dest_archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            error::create_dir(parent)?;
        }

        let staging = self.staging_dir(source_folder)?;
        let staged_tree = staging.path().join(&root_name);
        on_event(&BackupEvent::Staging {
            source: source_folder.to_path_buf(),
        });

        let outcome = copy_tree(source_folder, &staged_tree)
            .and_then(|()| write_archive(&staged_tree, &root_name, dest_archive_path, on_event));

        // Cleanup runs whatever happened above
        let staging_path = staging.path().to_path_buf();
        if let Err(e) = staging.close() {
            warn!("Failed to remove staging dir {}: {e}", staging_path.display());
            on_event(&BackupEvent::StagingCleanupFailed {
                path: staging_path,
                reason: e.to_string(),
            });
        }

        let stats = outcome?;
        let (sha256, archive_size) = calculate_file_hash(dest_archive_path)?;
        let result = ArchiveResult {
            archive_path: dest_archive_path.to_path_buf(),
            file_count: stats.file_count,
            total_bytes: stats.total_bytes,
            archive_size,
            sha256,
            elapsed: start.elapsed(),
        };

        on_event(&BackupEvent::SnapshotFinished {
            archive: result.archive_path.clone(),
            file_count: result.file_count,
            elapsed: result.elapsed,
        });
        info!(
            "✅ Snapshot created: {} ({} files, {} bytes)",
            dest_archive_path.display(),
            result.file_count,
            result.archive_size
        );
        Ok(result)
    }

    fn staging_dir(&self, source_folder: &Path) -> Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(STAGING_PREFIX);
        let created = match &self.staging_root {
            Some(root) => {
                error::create_dir(root)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        };
        created.map_err(|e| Error::StageCopy {
            path: source_folder.to_path_buf(),
            source: e,
        })
    }
}

/// Split a folder path into its parent directory and final name
///
/// The path is canonicalized when it exists so that `.`, `..` and trailing
/// separators resolve to a real name.
pub(crate) fn split_root(folder: &Path) -> Result<(PathBuf, OsString)> {
    let resolved = match fs::canonicalize(folder) {
        Ok(path) => path,
        Err(_) => std::path::absolute(folder).map_err(|e| Error::DirectoryRead {
            path: folder.to_path_buf(),
            source: e,
        })?,
    };

    match (resolved.parent(), resolved.file_name()) {
        (Some(parent), Some(name)) => Ok((parent.to_path_buf(), name.to_os_string())),
        _ => Err(Error::Config(format!(
            "'{}' has no parent folder to restore into",
            folder.display()
        ))),
    }
}

/// Recursively copy `source` to `target`, following symlinks
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    debug!("Staging {} -> {}", source.display(), target.display());
    let stage_error = |path: &Path, e: std::io::Error| Error::StageCopy {
        path: path.to_path_buf(),
        source: e,
    };

    for entry in sorted_walk(source).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            stage_error(&path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| stage_error(entry.path(), std::io::Error::other(e)))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| stage_error(entry.path(), e))?;
        } else {
            fs::copy(entry.path(), &destination).map_err(|e| stage_error(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Write the archive under a temporary name, then move it into place
fn write_archive(
    tree: &Path,
    root_name: &str,
    dest_archive_path: &Path,
    on_event: &dyn Fn(&BackupEvent),
) -> Result<ArchiveStats> {
    let mut partial_name = dest_archive_path.as_os_str().to_os_string();
    partial_name.push(PARTIAL_SUFFIX);
    let partial_path = PathBuf::from(partial_name);

    let written = create_zip_archive(tree, root_name, &partial_path, &mut |relative| {
        on_event(&BackupEvent::FileAdded {
            path: relative.to_path_buf(),
        });
    })
    .and_then(|stats| {
        fs::rename(&partial_path, dest_archive_path)
            .map(|()| stats)
            .map_err(|e| Error::ArchiveWrite {
                path: dest_archive_path.to_path_buf(),
                reason: e.to_string(),
            })
    });

    if written.is_err() {
        if let Err(e) = error::remove_file_if_exists(&partial_path) {
            warn!("Could not remove incomplete archive: {e}");
        }
    }
    written.map_err(|e| match e {
        Error::FileWrite { path, source } | Error::FileRead { path, source } => {
            Error::ArchiveWrite {
                path,
                reason: source.to_string(),
            }
        }
        other => other,
    })
}
