//! Filesystem helpers for staging and merging content.

use std::fs;
use std::path::Path;

use tracing::trace;

use super::error::{InstallError, InstallResult};
use super::layout::ensure_dir;

fn read_dir_entries(dir: &Path) -> InstallResult<Vec<fs::DirEntry>> {
    fs::read_dir(dir)
        .map_err(|e| InstallError::ReadFailed {
            path: dir.to_path_buf(),
            source: e,
        })?
        .map(|entry| {
            entry.map_err(|e| InstallError::ReadFailed {
                path: dir.to_path_buf(),
                source: e,
            })
        })
        .collect()
}

/// Recursively copy `source` into `dest`, creating `dest`.
pub fn copy_dir_recursive(source: &Path, dest: &Path) -> InstallResult<()> {
    ensure_dir(dest)?;

    for entry in read_dir_entries(source)? {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if source_path.is_dir() {
            copy_dir_recursive(&source_path, &dest_path)?;
        } else {
            fs::copy(&source_path, &dest_path).map_err(|e| InstallError::WriteFailed {
                path: dest_path,
                source: e,
            })?;
        }
    }

    Ok(())
}

/// Move a file or directory, falling back to copy-and-delete across devices.
pub fn move_path(source: &Path, dest: &Path) -> InstallResult<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    if source.is_dir() {
        copy_dir_recursive(source, dest)?;
        remove_path(source)
    } else {
        fs::copy(source, dest).map_err(|e| InstallError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        remove_path(source)
    }
}

/// Remove a file or directory tree if it exists.
pub fn remove_path(path: &Path) -> InstallResult<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else if path.exists() {
        fs::remove_file(path)
    } else {
        return Ok(());
    };
    result.map_err(|e| InstallError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Merge an overrides tree into `target`.
///
/// Directories present on both sides are merged recursively; any other
/// collision is resolved in favour of the overrides entry. Entries are
/// moved out of `overrides`.
pub fn merge_overrides(overrides: &Path, target: &Path) -> InstallResult<()> {
    ensure_dir(target)?;

    for entry in read_dir_entries(overrides)? {
        let source = entry.path();
        let dest = target.join(entry.file_name());

        if source.is_dir() && dest.is_dir() {
            merge_overrides(&source, &dest)?;
            continue;
        }
        if dest.exists() {
            trace!(path = %dest.display(), "Override replaces existing entry");
            remove_path(&dest)?;
        }
        move_path(&source, &dest)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let dest = temp.path().join("dest");

        fs::create_dir_all(source.join("subdir")).unwrap();
        fs::write(source.join("file1.txt"), "content1").unwrap();
        fs::write(source.join("subdir/file2.txt"), "content2").unwrap();

        copy_dir_recursive(&source, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("file1.txt")).unwrap(), "content1");
        assert_eq!(
            fs::read_to_string(dest.join("subdir/file2.txt")).unwrap(),
            "content2"
        );
    }

    #[test]
    fn test_merge_overrides() {
        let temp = TempDir::new().unwrap();
        let overrides = temp.path().join("overrides");
        let game = temp.path().join("game");

        fs::create_dir_all(overrides.join("config/sub")).unwrap();
        fs::write(overrides.join("config/a.cfg"), "new").unwrap();
        fs::write(overrides.join("config/sub/b.cfg"), "b").unwrap();
        fs::write(overrides.join("options.txt"), "opts").unwrap();

        fs::create_dir_all(game.join("config")).unwrap();
        fs::write(game.join("config/a.cfg"), "old").unwrap();
        fs::write(game.join("config/keep.cfg"), "keep").unwrap();

        merge_overrides(&overrides, &game).unwrap();

        assert_eq!(fs::read_to_string(game.join("config/a.cfg")).unwrap(), "new");
        assert_eq!(fs::read_to_string(game.join("config/keep.cfg")).unwrap(), "keep");
        assert_eq!(fs::read_to_string(game.join("config/sub/b.cfg")).unwrap(), "b");
        assert_eq!(fs::read_to_string(game.join("options.txt")).unwrap(), "opts");
    }

    #[test]
    fn test_merge_replaces_file_with_directory() {
        let temp = TempDir::new().unwrap();
        let overrides = temp.path().join("overrides");
        let game = temp.path().join("game");

        fs::create_dir_all(overrides.join("scripts")).unwrap();
        fs::write(overrides.join("scripts/init.zs"), "x").unwrap();
        fs::create_dir_all(&game).unwrap();
        fs::write(game.join("scripts"), "was a file").unwrap();

        merge_overrides(&overrides, &game).unwrap();

        assert!(game.join("scripts/init.zs").is_file());
    }

    #[test]
    fn test_remove_path_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        remove_path(&temp.path().join("nothing")).unwrap();
    }
}
