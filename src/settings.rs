//! Settings file persistence
//!
//! [`BackupConfig`] is stored as pretty-printed JSON. Keys the engine does
//! not know are carried through [`BackupConfig::extra`], so a host can keep
//! its own values (window position, debug flags) in the same file.

use crate::config::BackupConfig;
use crate::error::{self, Error, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Default settings file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Reads and writes a [`BackupConfig`] file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store for the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config dir>/<app_name>/settings.json`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the platform has no config directory.
    pub fn default_location(app_name: &str) -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        Ok(Self::new(base.join(app_name).join(SETTINGS_FILE)))
    }

    /// Path of the settings file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the settings file exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the settings file
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileRead`] if the file cannot be read, or
    /// [`Error::Serialize`] if it is not valid JSON.
    pub fn load(&self) -> Result<BackupConfig> {
        debug!("Loading settings from {}", self.path.display());
        let content = std::fs::read_to_string(&self.path).map_err(|e| Error::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the settings file
    ///
    /// Uses atomic write: writes to a temp file then renames it over the
    /// target, so a crash never leaves a half-written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, config: &BackupConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            error::create_dir(parent)?;
        }

        let file_name = self.path.file_name().ok_or_else(|| {
            Error::Config(format!(
                "Invalid path '{}': must have a filename",
                self.path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = self.path.with_file_name(temp_filename);

        std::fs::write(&temp_path, content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| Error::FileWrite {
            path: self.path.clone(),
            source: e,
        })?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }

    /// Load the settings file, writing the defaults first if it is missing
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load) and [`save`](Self::save).
    pub fn load_or_init(&self) -> Result<BackupConfig> {
        if self.exists() {
            return self.load();
        }
        info!("📝 Creating default settings at {}", self.path.display());
        let config = BackupConfig::default();
        self.save(&config)?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
