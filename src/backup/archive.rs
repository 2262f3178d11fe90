//! Archive handling for snapshots and restores.
//!
//! - **Creation**: [`create_zip_archive`] - compress a directory tree under a root entry name
//! - **Extraction**: [`extract_zip_archive`] - unpack an archive, rejecting entries that escape the target
//! - **Inspection**: [`inspect_zip_archive`] - read the index without extracting
//! - **Hashing**: [`calculate_file_hash`] - SHA-256 checksums of finished archives
//!
//! # Layout
//!
//! Every entry is stored below the name of the folder it was taken from:
//! ```text
//! BACKUP_003.zip
//! └── saves/
//!     ├── profile.dat
//!     └── slot1/
//!         └── world.sav
//! ```
//! Extracting into the parent of the source folder recreates it in place.

use crate::error::{self, Error, Result};
use log::warn;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs::{File, Metadata};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Counters collected while writing an archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub file_count: usize,
    pub total_bytes: u64,
}

/// What an archive contains, read from its index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of entries, directories included
    pub entries: usize,

    /// Number of file entries
    pub file_count: usize,

    /// Distinct top-level names
    pub roots: BTreeSet<String>,
}

/// Walk a tree in a stable order: a directory's files (by name), then its
/// subdirectories (by name), depth first
pub(crate) fn sorted_walk(root: &Path) -> WalkDir {
    WalkDir::new(root).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    })
}

/// Create a zip archive from a directory
///
/// Every entry is named `{root_name}/{path relative to tree_root}`.
/// `on_file` is called with the relative path of each stored file.
pub fn create_zip_archive(
    tree_root: &Path,
    root_name: &str,
    output_path: &Path,
    on_file: &mut dyn FnMut(&Path),
) -> Result<ArchiveStats> {
    let file = File::create(output_path).map_err(|e| Error::FileWrite {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut stats = ArchiveStats::default();

    zip.add_directory(format!("{root_name}/"), options.unix_permissions(0o755))
        .map_err(|e| write_error(output_path, e))?;

    for entry in sorted_walk(tree_root).min_depth(1) {
        let entry = entry.map_err(|e| write_error(output_path, e))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(tree_root)
            .map_err(|e| write_error(output_path, e))?;
        let Some(relative_name) = entry_name(relative) else {
            return Err(write_error(
                output_path,
                format!("'{}' is not a valid UTF-8 path", path.display()),
            ));
        };
        let name = format!("{root_name}/{relative_name}");
        let metadata = entry.metadata().map_err(|e| write_error(output_path, e))?;

        if metadata.is_dir() {
            zip.add_directory(
                format!("{name}/"),
                options.unix_permissions(file_mode(&metadata, 0o755)),
            )
            .map_err(|e| write_error(output_path, e))?;
            continue;
        }

        let size = metadata.len();
        let file_options = options
            .unix_permissions(file_mode(&metadata, 0o644))
            .large_file(size >= u64::from(u32::MAX));
        zip.start_file(name, file_options)
            .map_err(|e| write_error(output_path, e))?;

        let mut input = File::open(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::io::copy(&mut input, &mut zip).map_err(|e| write_error(output_path, e))?;

        stats.file_count += 1;
        stats.total_bytes += size;
        on_file(relative);
    }

    let mut writer = zip.finish().map_err(|e| write_error(output_path, e))?;
    writer.flush().map_err(|e| write_error(output_path, e))?;
    Ok(stats)
}

/// Extract a zip archive into a directory
///
/// Returns the number of files written.
pub fn extract_zip_archive(archive_path: &Path, output_dir: &Path) -> Result<usize> {
    let mut archive = open_archive(archive_path)?;
    let mut files = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extract_error(archive_path, e))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(extract_error(
                archive_path,
                format!("entry '{}' escapes the target directory", entry.name()),
            ));
        };
        let outpath = output_dir.join(relative);

        if entry.is_dir() {
            error::create_dir(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            error::create_dir(parent)?;
        }

        let mut outfile = File::create(&outpath).map_err(|e| Error::FileWrite {
            path: outpath.clone(),
            source: e,
        })?;
        std::io::copy(&mut entry, &mut outfile).map_err(|e| extract_error(archive_path, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
            if let Err(e) = std::fs::set_permissions(&outpath, permissions) {
                warn!("Could not set permissions on {}: {e}", outpath.display());
            }
        }

        files += 1;
    }

    Ok(files)
}

/// Read an archive's index without extracting anything
pub fn inspect_zip_archive(archive_path: &Path) -> Result<ArchiveSummary> {
    let archive = open_archive(archive_path)?;

    let mut summary = ArchiveSummary {
        entries: archive.len(),
        ..Default::default()
    };
    for name in archive.file_names() {
        if !name.ends_with('/') {
            summary.file_count += 1;
        }
        if let Some(root) = name.split('/').next().filter(|r| !r.is_empty()) {
            summary.roots.insert(root.to_string());
        }
    }

    Ok(summary)
}

/// Calculate SHA-256 hash of a file
pub fn calculate_file_hash(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    let mut total_size = 0u64;

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        if bytes_read == 0 {
            break;
        }

        total_size += bytes_read as u64;
        hasher.update(&buffer[..bytes_read]);
    }

    let hash = format!("{:x}", hasher.finalize());
    Ok((hash, total_size))
}

fn open_archive(archive_path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(archive_path).map_err(|e| Error::FileRead {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| extract_error(archive_path, e))
}

/// Zip entry name for a relative path (always `/`-separated)
///
/// `None` if a component is not valid UTF-8.
fn entry_name(relative: &Path) -> Option<String> {
    relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()
        .map(|parts| parts.join("/"))
}

#[cfg(unix)]
fn file_mode(metadata: &Metadata, _fallback: u32) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &Metadata, fallback: u32) -> u32 {
    fallback
}

fn write_error(path: &Path, reason: impl ToString) -> Error {
    Error::ArchiveWrite {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn extract_error(path: &Path, reason: impl ToString) -> Error {
    Error::Extract {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
