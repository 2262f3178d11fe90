//! Builder for BackupManager
//!
//! This module contains [`BackupManagerBuilder`] which provides a fluent API
//! for creating a [`BackupManager`](super::BackupManager).

use crate::backup::{RestorePolicy, SnapshotWriter};
use crate::config::BackupConfig;
use crate::error::Result;
#[cfg(feature = "settings")]
use crate::settings::SettingsStore;
use std::path::PathBuf;

use super::BackupManager;

/// Builder for creating a [`BackupManager`] with a fluent API.
///
/// # Example
///
/// ```rust,no_run
/// use savekeep::{BackupConfig, BackupManager, RestorePolicy};
///
/// let manager = BackupManager::builder()
///     .config(
///         BackupConfig::builder()
///             .source_folder("~/.local/share/MyGame/saves")
///             .dest_folder("~/backups/MyGame")
///             .build(),
///     )
///     .policy(RestorePolicy::strict())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct BackupManagerBuilder {
    config: Option<BackupConfig>,
    policy: RestorePolicy,
    staging_root: Option<PathBuf>,
    #[cfg(feature = "settings")]
    store: Option<SettingsStore>,
}

impl BackupManagerBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration (default: [`BackupConfig::default`])
    #[must_use]
    pub fn config(mut self, config: BackupConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set how failing restore steps are handled
    #[must_use]
    pub fn policy(mut self, policy: RestorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stage snapshot copies under `path` instead of the system temp directory
    #[must_use]
    pub fn staging_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_root = Some(path.into());
        self
    }

    /// Persist configuration changes to a settings file.
    ///
    /// If no config was set explicitly, it is loaded from the store (and
    /// the file is created with defaults when missing).
    #[cfg(feature = "settings")]
    #[must_use]
    pub fn settings_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`BackupManager`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid, or an I/O error if the settings file cannot be loaded.
    pub fn build(self) -> Result<BackupManager> {
        #[cfg(feature = "settings")]
        let config = match (self.config, &self.store) {
            (Some(config), _) => config,
            (None, Some(store)) => store.load_or_init()?,
            (None, None) => BackupConfig::default(),
        };
        #[cfg(not(feature = "settings"))]
        let config = self.config.unwrap_or_default();

        config.validate()?;

        let mut writer = SnapshotWriter::new();
        if let Some(root) = self.staging_root {
            writer = writer.staging_root(root);
        }

        let manager = BackupManager::from_parts(config, writer, self.policy);
        #[cfg(feature = "settings")]
        let manager = manager.with_store(self.store);
        Ok(manager)
    }
}
