//! Common test utilities for savekeep integration tests
//!
//! Provides a temporary save folder, a backup folder and a configured
//! BackupManager.

#![allow(dead_code)]

use savekeep::{BackupConfig, BackupConfigBuilder, BackupManager, RestorePolicy};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// =============================================================================
// Test Fixtures
// =============================================================================

/// Test fixture with a populated source folder and an empty backup folder
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub manager: BackupManager,
}

impl TestFixture {
    /// Create a new test fixture with default configuration
    pub fn new() -> Self {
        Self::with_policy(RestorePolicy::default())
    }

    /// Create a fixture whose manager uses `policy` for restores
    pub fn with_policy(policy: RestorePolicy) -> Self {
        Self::build(policy, |builder| builder)
    }

    /// Create a fixture using the legacy `.7z` settings
    pub fn legacy() -> Self {
        Self::build(RestorePolicy::default(), |builder| {
            builder.file_ext(".7z").safety_backup("SAFETY_BACKUP.7z")
        })
    }

    fn build(
        policy: RestorePolicy,
        customize: impl FnOnce(BackupConfigBuilder) -> BackupConfigBuilder,
    ) -> Self {
        init_logging();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let source = temp_dir.path().join("saves");
        write_save_tree(&source);

        let builder = BackupConfig::builder()
            .source_folder(&source)
            .dest_folder(temp_dir.path().join("backups"));
        let config = customize(builder).build();
        let manager = BackupManager::builder()
            .config(config)
            .policy(policy)
            .staging_root(temp_dir.path().join("staging"))
            .build()
            .expect("Failed to create manager");

        Self { temp_dir, manager }
    }

    /// Folder being backed up
    pub fn source(&self) -> PathBuf {
        self.temp_dir.path().join("saves")
    }

    /// Folder holding the archives
    pub fn dest(&self) -> PathBuf {
        self.temp_dir.path().join("backups")
    }

    /// Folder used for staging copies
    pub fn staging(&self) -> PathBuf {
        self.temp_dir.path().join("staging")
    }

    /// Path of an archive in the backup folder
    pub fn archive(&self, name: &str) -> PathBuf {
        self.dest().join(name)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Route library logs through the test harness (ignored if already set)
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Populate `root` with a small save-game tree
pub fn write_save_tree(root: &Path) {
    fs::create_dir_all(root.join("slot1")).unwrap();
    fs::create_dir_all(root.join("slot2/screenshots")).unwrap();
    fs::write(root.join("profile.dat"), "profile v1").unwrap();
    fs::write(root.join("slot1/world.sav"), "world one").unwrap();
    fs::write(root.join("slot2/world.sav"), "world two").unwrap();
    fs::write(root.join("slot2/screenshots/shot.png"), [0u8, 1, 2, 3]).unwrap();
}

/// Map of relative path to contents for every file below `root`
pub fn snapshot_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Create empty files in `dir`
pub fn touch(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), b"").unwrap();
    }
}
