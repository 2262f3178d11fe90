//! Main backup manager module
//!
//! This module contains the [`BackupManager`] struct which is the primary entry point
//! for front ends: "create next backup", "restore most recent", "restore this file".

mod builder;
mod size;

pub use builder::BackupManagerBuilder;
pub use size::{folder_size, format_size};

use crate::backup::{
    ArchiveResult, BackupCatalog, BackupEntry, RestoreEngine, RestoreOptions, RestorePolicy,
    RestoreResult, SnapshotWriter,
};
use crate::config::BackupConfig;
use crate::error::{Error, Result};
use crate::events::{BackupEvent, EventManager};
#[cfg(feature = "settings")]
use crate::settings::SettingsStore;
use crate::sync::{OperationLock, RwLockExt};
use log::{debug, info};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Ties the catalog, snapshot writer and restore engine to one configuration.
///
/// The manager owns the current [`BackupConfig`]; every operation takes a
/// copy of it when it starts, so a config change never affects an
/// operation already running. Only one create or restore runs at a time:
/// a second call while one is in progress fails with [`Error::Busy`].
///
/// # Example
///
/// ```rust,no_run
/// use savekeep::{BackupConfig, BackupManager};
///
/// let manager = BackupManager::new(
///     BackupConfig::builder()
///         .source_folder("/games/MyGame/saves")
///         .dest_folder("/backups/MyGame")
///         .build(),
/// )
/// .unwrap();
///
/// manager.on_event(|event| println!("{event}"));
///
/// let created = manager.create_next().unwrap();
/// println!("wrote {}", created.archive_path.display());
///
/// // Later: put the newest archive back (taking a safety backup first)
/// manager.restore_latest().unwrap();
/// ```
#[derive(Debug)]
pub struct BackupManager {
    /// Current configuration
    config: RwLock<BackupConfig>,

    /// Writes new archives
    writer: SnapshotWriter,

    /// Restores archives (shares the writer for safety backups)
    engine: RestoreEngine,

    /// Listeners for progress events
    events: Arc<EventManager>,

    /// At most one create/restore at a time
    operation: OperationLock,

    /// Settings file that config changes are saved to
    #[cfg(feature = "settings")]
    store: Option<SettingsStore>,
}

impl BackupManager {
    /// Create a new builder for `BackupManager`
    #[must_use]
    pub fn builder() -> BackupManagerBuilder {
        BackupManagerBuilder::new()
    }

    /// Create a manager with the default restore policy
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(config: BackupConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a manager whose configuration lives in a settings file
    ///
    /// The file is created with defaults if it does not exist, and every
    /// later [`set_config`](Self::set_config) writes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds an invalid config.
    #[cfg(feature = "settings")]
    pub fn from_settings(store: SettingsStore) -> Result<Self> {
        Self::builder().settings_store(store).build()
    }

    pub(crate) fn from_parts(
        config: BackupConfig,
        writer: SnapshotWriter,
        policy: RestorePolicy,
    ) -> Self {
        let engine = RestoreEngine::new()
            .with_writer(writer.clone())
            .with_policy(policy);
        Self {
            config: RwLock::new(config),
            writer,
            engine,
            events: Arc::new(EventManager::new()),
            operation: OperationLock::default(),
            #[cfg(feature = "settings")]
            store: None,
        }
    }

    #[cfg(feature = "settings")]
    pub(crate) fn with_store(mut self, store: Option<SettingsStore>) -> Self {
        self.store = store;
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Copy of the current configuration
    #[must_use]
    pub fn config(&self) -> BackupConfig {
        self.config.read_recovered().clone()
    }

    /// Replace the configuration
    ///
    /// The new config is validated first and, when a settings file is
    /// attached, saved before it takes effect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the config is invalid, or an I/O error
    /// if it cannot be saved. The current config is kept on error.
    pub fn set_config(&self, config: BackupConfig) -> Result<()> {
        config.validate()?;

        #[cfg(feature = "settings")]
        if let Some(store) = &self.store {
            store.save(&config)?;
        }

        debug!("Configuration updated");
        *self.config.write_recovered() = config;
        Ok(())
    }

    /// Change the configuration in place
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use savekeep::BackupManager;
    /// # let manager = BackupManager::new(Default::default()).unwrap();
    /// manager.update_config(|config| config.make_backup = false).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`set_config`](Self::set_config).
    pub fn update_config<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut BackupConfig),
    {
        let mut config = self.config();
        update(&mut config);
        self.set_config(config)
    }

    /// Settings file attached to this manager
    #[cfg(feature = "settings")]
    #[must_use]
    pub fn settings_store(&self) -> Option<&SettingsStore> {
        self.store.as_ref()
    }

    /// Restore failure policy
    #[must_use]
    pub fn policy(&self) -> RestorePolicy {
        self.engine.policy()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register a listener for progress events
    pub fn on_event<F>(&self, callback: F)
    where
        F: Fn(&BackupEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback);
    }

    /// Get the event manager
    #[must_use]
    pub fn events(&self) -> &Arc<EventManager> {
        &self.events
    }

    fn emit(&self, event: &BackupEvent) {
        self.events.emit(event);
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    fn catalog(config: &BackupConfig) -> BackupCatalog {
        BackupCatalog::from_config(config)
    }

    /// Archive names in the destination folder, safety backup first
    #[must_use]
    pub fn list_backups(&self) -> Vec<String> {
        Self::catalog(&self.config()).list()
    }

    /// Archives in the destination folder with file metadata
    #[must_use]
    pub fn backup_entries(&self) -> Vec<BackupEntry> {
        Self::catalog(&self.config()).entries()
    }

    /// Name of the newest versioned archive (sentinel name if there is none)
    #[must_use]
    pub fn highest_backup(&self) -> String {
        Self::catalog(&self.config()).highest()
    }

    /// Whether a create or restore is running
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.operation.is_busy()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Snapshot the source folder into the next versioned archive
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another operation is running, or any error
    /// of [`SnapshotWriter::create`].
    pub fn create_next(&self) -> Result<ArchiveResult> {
        let _guard = self.operation.try_acquire()?;
        let config = self.config();
        let catalog = Self::catalog(&config);

        let name = catalog.naming().next(&catalog.highest())?;
        let dest = catalog.path_of(&name);
        info!("📦 Creating backup {name}");

        self.writer
            .create(&config.source_folder, &dest, &|event| self.emit(event))
    }

    /// Restore the newest versioned archive
    ///
    /// A safety backup is taken first when `MAKE_BACKUP` is on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArchiveNotFound`] if there is no archive, or any
    /// error of [`RestoreEngine::restore`].
    pub fn restore_latest(&self) -> Result<RestoreResult> {
        let _guard = self.operation.try_acquire()?;
        let config = self.config();
        let catalog = Self::catalog(&config);
        let archive = catalog.path_of(&catalog.highest());
        self.run_restore(&config, &archive)
    }

    /// Restore a specific archive file
    ///
    /// # Errors
    ///
    /// Same as [`restore_latest`](Self::restore_latest).
    pub fn restore_specific(&self, archive_path: impl AsRef<Path>) -> Result<RestoreResult> {
        let _guard = self.operation.try_acquire()?;
        let config = self.config();
        self.run_restore(&config, archive_path.as_ref())
    }

    /// Restore an archive of the destination folder by file name
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `name` is not a plain file name,
    /// otherwise the same as [`restore_latest`](Self::restore_latest).
    pub fn restore_named(&self, name: &str) -> Result<RestoreResult> {
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(Error::Config(format!(
                "'{name}' is not a backup file name"
            )));
        }
        let _guard = self.operation.try_acquire()?;
        let config = self.config();
        let archive = Self::catalog(&config).path_of(name);
        self.run_restore(&config, &archive)
    }

    fn run_restore(&self, config: &BackupConfig, archive: &Path) -> Result<RestoreResult> {
        let mut options =
            RestoreOptions::from_path(archive).source_folder(&config.source_folder);
        if config.make_backup {
            options = options.safety_backup(config.safety_backup_path());
        }
        self.engine.restore(&options, &|event| self.emit(event))
    }

    // =========================================================================
    // Host helpers
    // =========================================================================

    /// Size of the source folder in bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceMissing`] if the source folder does not exist.
    pub fn source_size(&self) -> Result<u64> {
        folder_size(&self.config().source_folder)
    }

    /// Start the configured application detached
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no `APP_PATH` is set, or any error of
    /// [`launch_detached`](crate::launch_detached).
    #[cfg(feature = "launch")]
    pub fn launch_app(&self) -> Result<u32> {
        let config = self.config();
        let path = config
            .app_path()
            .ok_or_else(|| Error::Config("APP_PATH is not set".into()))?;
        crate::launcher::launch_detached(path)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn manager_in(root: &Path) -> BackupManager {
        let source = root.join("saves");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("slot.sav"), "data").unwrap();
        BackupManager::new(
            BackupConfig::builder()
                .source_folder(&source)
                .dest_folder(root.join("backups"))
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_next_numbers_sequentially() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());

        let first = manager.create_next().unwrap();
        let second = manager.create_next().unwrap();

        assert!(first.archive_path.ends_with("BACKUP_000.zip"));
        assert!(second.archive_path.ends_with("BACKUP_001.zip"));
        assert_eq!(manager.highest_backup(), "BACKUP_001.zip");
        assert!(!manager.is_busy());
    }

    #[test]
    fn test_restore_latest_without_archives() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());

        assert!(matches!(
            manager.restore_latest(),
            Err(Error::ArchiveNotFound(_))
        ));
        assert!(temp.path().join("saves/slot.sav").exists());
    }

    #[test]
    fn test_invalid_config_rejected_and_kept() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());

        let result = manager.update_config(|config| config.file_name.clear());
        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(manager.config().file_name, "BACKUP_");
    }

    #[test]
    fn test_restore_named_rejects_paths() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());

        assert!(matches!(
            manager.restore_named("../elsewhere.zip"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_source_size() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());
        assert_eq!(manager.source_size().unwrap(), 4);
    }

    #[cfg(feature = "launch")]
    #[test]
    fn test_launch_without_app_path() {
        let temp = tempdir().unwrap();
        let manager = manager_in(temp.path());
        assert!(matches!(manager.launch_app(), Err(Error::Config(_))));
    }

    #[test]
    fn test_manager_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackupManager>();
    }
}
