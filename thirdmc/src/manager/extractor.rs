//! Zip extraction for packs, natives and loader jars.
//!
//! This module handles:
//! - Extracting zip/jar archives into a target directory
//! - Skipping excluded top-level entries (e.g. `META-INF/` in natives)
//! - Reading a single entry without unpacking the archive

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::{InstallError, InstallResult};

/// Summary of an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub files: usize,
    pub directories: usize,
    pub excluded: usize,
}

/// Zip-based archive extractor.
#[derive(Debug, Clone, Default)]
pub struct ZipExtractor {
    exclude: Vec<String>,
}

impl ZipExtractor {
    /// Create a new extractor that unpacks everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip entries whose path starts with `prefix`.
    pub fn with_exclude(mut self, prefix: impl Into<String>) -> Self {
        self.exclude.push(prefix.into());
        self
    }

    /// Extract every entry of `archive` below `target`.
    ///
    /// Entries whose names would escape `target` are rejected.
    pub fn extract(&self, archive: &Path, target: &Path) -> InstallResult<ExtractReport> {
        let mut zip = open_archive(archive)?;
        fs::create_dir_all(target).map_err(|e| InstallError::CreateDirFailed {
            path: target.to_path_buf(),
            source: e,
        })?;

        let mut report = ExtractReport::default();

        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .map_err(|e| extraction_error(archive, e))?;

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| InstallError::ExtractionFailed {
                    path: archive.to_path_buf(),
                    reason: format!("entry {:?} escapes the target directory", entry.name()),
                })?;

            if self.is_excluded(entry.name()) {
                trace!(entry = entry.name(), "Excluded from extraction");
                report.excluded += 1;
                continue;
            }

            let out_path = target.join(&relative);
            if entry.is_dir() {
                fs::create_dir_all(&out_path).map_err(|e| InstallError::CreateDirFailed {
                    path: out_path.clone(),
                    source: e,
                })?;
                report.directories += 1;
                continue;
            }

            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| InstallError::CreateDirFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            let mut out = File::create(&out_path).map_err(|e| InstallError::WriteFailed {
                path: out_path.clone(),
                source: e,
            })?;
            io::copy(&mut entry, &mut out).map_err(|e| InstallError::WriteFailed {
                path: out_path.clone(),
                source: e,
            })?;
            report.files += 1;
        }

        debug!(
            archive = %archive.display(),
            target = %target.display(),
            files = report.files,
            "Extracted archive"
        );
        Ok(report)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Read one entry of an archive into memory.
///
/// Returns `Ok(None)` when the entry does not exist.
pub fn read_entry(archive: &Path, name: &str) -> InstallResult<Option<Vec<u8>>> {
    let mut zip = open_archive(archive)?;
    let mut entry = match zip.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(extraction_error(archive, e)),
    };
    let mut data = Vec::with_capacity(preallocation(entry.size()));
    entry
        .read_to_end(&mut data)
        .map_err(|e| InstallError::ReadFailed {
            path: archive.to_path_buf(),
            source: e,
        })?;
    Ok(Some(data))
}

/// Upper bound on the buffer reserved up front for an entry.
const MAX_PREALLOCATION: u64 = 1024 * 1024;

/// Buffer to reserve for an entry whose header declares `declared` bytes.
/// The header is archive-controlled; the buffer still grows as data arrives.
fn preallocation(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

fn open_archive(archive: &Path) -> InstallResult<ZipArchive<BufReader<File>>> {
    let file = File::open(archive).map_err(|e| InstallError::ReadFailed {
        path: archive.to_path_buf(),
        source: e,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| extraction_error(archive, e))
}

fn extraction_error(archive: &Path, e: ZipError) -> InstallError {
    InstallError::ExtractionFailed {
        path: archive.to_path_buf(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::zip_bytes;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_zip(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("archive.zip");
        fs::write(&path, zip_bytes(entries)).unwrap();
        path
    }

    #[test]
    fn test_extract_all() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(
            temp.path(),
            &[("a.txt", b"alpha"), ("nested/deep/b.txt", b"beta")],
        );
        let target = temp.path().join("out");

        let report = ZipExtractor::new().extract(&archive, &target).unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(target.join("nested/deep/b.txt")).unwrap(), b"beta");
    }

    #[test]
    fn test_extract_excludes_meta_inf() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(
            temp.path(),
            &[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0"),
                ("liblwjgl.so", b"\x7fELF"),
            ],
        );
        let target = temp.path().join("natives");

        let report = ZipExtractor::new()
            .with_exclude("META-INF/")
            .extract(&archive, &target)
            .unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.excluded, 1);
        assert!(target.join("liblwjgl.so").exists());
        assert!(!target.join("META-INF").exists());
    }

    #[test]
    fn test_read_entry() {
        let temp = TempDir::new().unwrap();
        let archive = write_zip(temp.path(), &[("version.json", b"{}")]);

        assert_eq!(read_entry(&archive, "version.json").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(read_entry(&archive, "missing.json").unwrap(), None);
    }

    #[test]
    fn test_not_a_zip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.zip");
        fs::write(&path, b"definitely not a zip").unwrap();

        let result = ZipExtractor::new().extract(&path, &temp.path().join("out"));
        assert!(matches!(result, Err(InstallError::ExtractionFailed { .. })));
    }

    #[test]
    fn test_declared_size_does_not_drive_allocation() {
        assert_eq!(preallocation(12), 12);
        assert_eq!(preallocation(u64::MAX), MAX_PREALLOCATION as usize);
        assert_eq!(preallocation(0xFFFF_FFFE), MAX_PREALLOCATION as usize);
    }

    #[test]
    fn test_read_entry_larger_than_preallocation() {
        let temp = TempDir::new().unwrap();
        let big = vec![7u8; MAX_PREALLOCATION as usize + 10];
        let archive = write_zip(temp.path(), &[("big.bin", &big)]);

        assert_eq!(read_entry(&archive, "big.bin").unwrap().unwrap(), big);
    }
}
