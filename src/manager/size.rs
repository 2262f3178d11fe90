//! Folder size helpers

use crate::error::{Error, Result};
use walkdir::WalkDir;

const UNITS: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Total size in bytes of all files below `path`
///
/// Unreadable entries are skipped.
///
/// # Errors
///
/// Returns [`Error::SourceMissing`] if `path` is not a directory.
pub fn folder_size(path: &std::path::Path) -> Result<u64> {
    if !path.is_dir() {
        return Err(Error::SourceMissing(path.to_path_buf()));
    }
    Ok(WalkDir::new(path)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum())
}

/// Human-readable size with binary units
///
/// ```rust
/// use savekeep::format_size;
///
/// assert_eq!(format_size(512), "512.0B");
/// assert_eq!(format_size(1536), "1.5KiB");
/// assert_eq!(format_size(5 * 1024 * 1024), "5.0MiB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:.1}{unit}B");
        }
        size /= 1024.0;
    }
    format!("{size:.1}YiB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_folder_size_sums_nested_files() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("a/b")).unwrap();
        std::fs::write(temp.path().join("one"), [0u8; 100]).unwrap();
        std::fs::write(temp.path().join("a/b/two"), [0u8; 24]).unwrap();

        assert_eq!(folder_size(temp.path()).unwrap(), 124);
    }

    #[test]
    fn test_folder_size_missing() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            folder_size(&temp.path().join("gone")),
            Err(Error::SourceMissing(_))
        ));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0.0B");
        assert_eq!(format_size(1023), "1023.0B");
        assert_eq!(format_size(1024), "1.0KiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0GiB");
    }
}
