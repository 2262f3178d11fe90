//! Backup and restore module for savekeep
//!
//! - [`NamingScheme`] - versioned archive names (`BACKUP_007.zip`)
//! - [`BackupCatalog`] - listing of a destination folder
//! - [`SnapshotWriter`] - folder to archive
//! - [`RestoreEngine`] - archive back over a folder, with a safety backup first

mod archive;
mod catalog;
mod naming;
mod restore;
mod snapshot;
mod types;

pub use archive::{ArchiveSummary, inspect_zip_archive};
pub use catalog::BackupCatalog;
pub use naming::NamingScheme;
pub use restore::RestoreEngine;
pub use snapshot::SnapshotWriter;

pub use types::{
    ArchiveResult, BackupEntry, RestoreOptions, RestorePolicy, RestoreResult, RestoreStage,
    StepPolicy,
};
