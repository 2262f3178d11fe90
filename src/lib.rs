//! # savekeep - versioned folder snapshots
//!
//! A small library for keeping numbered backups of a folder (typically a
//! game's save directory) and putting any of them back safely.
//!
//! ## Features
//!
//! - **Versioned names**: `BACKUP_000.zip`, `BACKUP_001.zip`, ... with numeric ordering
//! - **Consistent snapshots**: the folder is staged to a temp copy before compression
//! - **Safe restore**: a safety backup is taken and the archive is checked before anything is deleted
//! - **Progress events**: every step reports a human-readable [`BackupEvent`]
//! - **Settings file**: configuration persisted as JSON, unknown keys kept (`settings` feature)
//! - **Launcher**: start the associated application detached (`launch` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use savekeep::{BackupConfig, BackupManager};
//!
//! let manager = BackupManager::builder()
//!     .config(
//!         BackupConfig::builder()
//!             .source_folder("~/.local/share/MyGame/saves")
//!             .dest_folder("~/backups/MyGame")
//!             .build(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! manager.on_event(|event| println!("{event}"));
//!
//! // BACKUP_000.zip, then BACKUP_001.zip, ...
//! let created = manager.create_next().unwrap();
//! println!("{} files, sha256 {}", created.file_count, created.sha256);
//!
//! for name in manager.list_backups() {
//!     println!("{name}");
//! }
//!
//! // Put the newest archive back; SAFETY_BACKUP.zip holds the state it replaced
//! let restored = manager.restore_latest().unwrap();
//! println!("restored {} files", restored.files_restored);
//! ```
//!
//! ## Settings File
//!
//! ```rust,no_run
//! # #[cfg(feature = "settings")]
//! # fn main() -> savekeep::Result<()> {
//! use savekeep::{BackupManager, SettingsStore};
//!
//! let manager = BackupManager::from_settings(SettingsStore::default_location("savekeep")?)?;
//!
//! // Saved to the settings file before it takes effect
//! manager.update_config(|config| config.make_backup = false)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "settings"))]
//! # fn main() {}
//! ```
//!
//! ## Lower-level Pieces
//!
//! The manager is a thin layer over parts that can be used directly:
//!
//! ```rust,no_run
//! use savekeep::{BackupCatalog, NamingScheme, RestoreEngine, RestoreOptions, SnapshotWriter};
//! use std::path::Path;
//!
//! # fn main() -> savekeep::Result<()> {
//! let catalog = BackupCatalog::new("backups", NamingScheme::new("BACKUP_", ".zip"), "SAFETY_BACKUP.zip");
//! let next = catalog.naming().next(&catalog.highest())?;
//!
//! SnapshotWriter::new().create(Path::new("saves"), &catalog.path_of(&next), &|_| {})?;
//!
//! RestoreEngine::new().restore(
//!     &RestoreOptions::from_path(catalog.path_of(&next))
//!         .source_folder("saves")
//!         .safety_backup(catalog.path_of("SAFETY_BACKUP.zip")),
//!     &|event| println!("{event}"),
//! )?;
//! # Ok(())
//! # }
//! ```

// Core modules
mod error;
mod events;
mod manager;
mod sync;

pub mod backup;
pub mod config;

#[cfg(feature = "settings")]
pub mod settings;

#[cfg(feature = "launch")]
mod launcher;

pub use error::{Error, Result};
pub use events::{BackupEvent, BatchedLog, DEFAULT_BATCH_INTERVAL, EventCallback, EventManager};
pub use manager::{BackupManager, BackupManagerBuilder, folder_size, format_size};

pub use config::{BackupConfig, BackupConfigBuilder};

pub use backup::{
    ArchiveResult, BackupCatalog, BackupEntry, NamingScheme, RestoreEngine, RestoreOptions,
    RestorePolicy, RestoreResult, RestoreStage, SnapshotWriter, StepPolicy,
};

#[cfg(feature = "settings")]
pub use settings::SettingsStore;

#[cfg(feature = "launch")]
pub use launcher::launch_detached;
