//! Error types for savekeep

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for savekeep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for savekeep
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Naming Errors
    // -------------------------------------------------------------------------
    #[error("Malformed backup filename '{name}': {reason}")]
    Format { name: String, reason: String },

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Source folder not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to stage copy of '{path}': {source}")]
    StageCopy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive '{path}': {reason}")]
    ArchiveWrite { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Restore Errors
    // -------------------------------------------------------------------------
    #[error("Backup archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    #[error("Safety backup failed: {0}")]
    SafetyBackup(#[source] Box<Error>),

    #[error("Failed to delete '{path}': {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract archive '{path}': {reason}")]
    Extract { path: PathBuf, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Another backup or restore is already running")]
    Busy,

    // -------------------------------------------------------------------------
    // Launcher Errors (launch feature)
    // -------------------------------------------------------------------------
    #[cfg(feature = "launch")]
    #[error("Executable not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[cfg(feature = "launch")]
    #[error("File is not executable: {}", .0.display())]
    NotExecutable(PathBuf),

    #[cfg(feature = "launch")]
    #[error("Failed to start '{path}': {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::SourceMissing(_) | Error::ArchiveNotFound(_) => true,
            #[cfg(feature = "launch")]
            Error::ExecutableNotFound(_) => true,
            _ => false,
        }
    }

    /// Check if the operation failed before touching the filesystem
    ///
    /// Validation errors are raised before any destructive step, so the
    /// source folder is guaranteed to be as it was.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::SourceMissing(_) | Error::ArchiveNotFound(_) | Error::Config(_) | Error::Busy
        )
    }
}

// =============================================================================
// Filesystem Helper Functions
// =============================================================================
// These reduce repetitive map_err patterns in the backup module.

/// Create a directory (and parents) with proper error handling
pub fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove a file, treating "not found" as success
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Delete {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
