//! Catalog & Naming Integration Tests
//!
//! Tests for how archives in the backup folder are named, listed and ordered.

mod common;

use common::{TestFixture, touch};
use savekeep::{BackupCatalog, BackupConfig, Error, NamingScheme};

// =============================================================================
// Naming
// =============================================================================

#[test]
fn test_format_parse_roundtrip() {
    let scheme = NamingScheme::new("BACKUP_", ".7z");
    for version in [0, 1, 9, 10, 99, 100, 999, 1000, 123_456] {
        assert_eq!(scheme.parse(&scheme.format(version)).unwrap(), version as i64);
    }
}

#[test]
fn test_next_increments_by_one() {
    let scheme = NamingScheme::new("SAVE-", ".zip");
    let mut name = scheme.sentinel();
    for expected in 0..25 {
        name = scheme.next(&name).unwrap();
        assert_eq!(scheme.parse(&name).unwrap(), expected);
    }
    assert_eq!(name, "SAVE-024.zip");
}

#[test]
fn test_sentinel_next_is_version_zero() {
    let scheme = NamingScheme::new("BACKUP_", ".7z");
    assert_eq!(scheme.next(&scheme.sentinel()).unwrap(), "BACKUP_000.7z");
}

#[test]
fn test_unpadded_legacy_name() {
    let scheme = NamingScheme::new("BACKUP_", ".7z");
    assert_eq!(scheme.parse("BACKUP_7.7z").unwrap(), 7);
    assert_eq!(scheme.next("BACKUP_7.7z").unwrap(), "BACKUP_008.7z");
}

#[test]
fn test_malformed_names() {
    let scheme = NamingScheme::new("BACKUP_", ".7z");
    assert!(matches!(scheme.parse("BACKUP_.7z"), Err(Error::Format { .. })));
    assert!(matches!(scheme.parse("OTHER_001.7z"), Err(Error::Format { .. })));
    assert!(scheme.next("BACKUP_latest.7z").is_err());
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_safety_backup_first_even_when_sorting_last() {
    let temp = tempfile::tempdir().unwrap();
    // "ZZ_SAFETY" would sort after every BACKUP_ name
    touch(temp.path(), &["BACKUP_000.7z", "BACKUP_001.7z", "ZZ_SAFETY.7z"]);
    let catalog = BackupCatalog::new(temp.path(), NamingScheme::new("BACKUP_", ".7z"), "ZZ_SAFETY.7z");

    assert_eq!(
        catalog.list(),
        vec!["ZZ_SAFETY.7z", "BACKUP_001.7z", "BACKUP_000.7z"]
    );
}

#[test]
fn test_highest_skips_safety_that_sorts_first() {
    let temp = tempfile::tempdir().unwrap();
    // The safety name matches the pattern and would parse higher than anything
    touch(temp.path(), &["BACKUP_999_SAFETY.7z", "BACKUP_002.7z", "BACKUP_010.7z"]);
    let catalog = BackupCatalog::new(
        temp.path(),
        NamingScheme::new("BACKUP_", ".7z"),
        "BACKUP_999_SAFETY.7z",
    );

    assert_eq!(catalog.list()[0], "BACKUP_999_SAFETY.7z");
    assert_eq!(catalog.highest(), "BACKUP_010.7z");
}

#[test]
fn test_list_twice_is_identical() {
    let fixture = TestFixture::new();
    fixture.manager.create_next().unwrap();
    fixture.manager.create_next().unwrap();
    fixture.manager.restore_latest().unwrap();

    let first = fixture.manager.list_backups();
    let second = fixture.manager.list_backups();
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec!["SAFETY_BACKUP.zip", "BACKUP_001.zip", "BACKUP_000.zip"]
    );
}

#[test]
fn test_backup_entries_metadata() {
    let fixture = TestFixture::new();
    let created = fixture.manager.create_next().unwrap();

    let entries = fixture.manager.backup_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "BACKUP_000.zip");
    assert_eq!(entries[0].version, Some(0));
    assert_eq!(entries[0].size, created.archive_size);
    assert!(!entries[0].is_safety);
}

#[test]
fn test_catalog_from_config() {
    let temp = tempfile::tempdir().unwrap();
    touch(temp.path(), &["SAVE_003.7z", "BACKUP_004.zip"]);
    let config = BackupConfig::builder()
        .dest_folder(temp.path())
        .file_name("SAVE_")
        .file_ext(".7z")
        .build();

    let catalog = BackupCatalog::from_config(&config);
    assert_eq!(catalog.list(), vec!["SAVE_003.7z"]);
    assert_eq!(catalog.path_of("SAVE_003.7z"), temp.path().join("SAVE_003.7z"));
}
