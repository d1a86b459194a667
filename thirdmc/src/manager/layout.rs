//! On-disk layout of the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{InstallError, InstallResult};

/// Paths under the data directory.
///
/// ```text
/// <root>/
///   versions/<id>/<id>.json, <id>.jar
///   assets/indexes/<id>.json
///   assets/objects/<hh>/<hash>
///   libraries/<maven path>
///   games/<instance or package dir>
///   modpacks/
///   .tmp/
///   settings.json
///   logs/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn versions(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions().join(id)
    }

    pub fn version_json(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.json", id))
    }

    pub fn version_jar(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.jar", id))
    }

    pub fn assets(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_index(&self, id: &str) -> PathBuf {
        self.assets().join("indexes").join(format!("{}.json", id))
    }

    /// Content-addressed object path: `objects/<first two hex chars>/<hash>`.
    pub fn asset_object(&self, hash: &str) -> PathBuf {
        let prefix = hash.get(..2).unwrap_or(hash);
        self.assets().join("objects").join(prefix).join(hash)
    }

    pub fn libraries(&self) -> PathBuf {
        self.root.join("libraries")
    }

    pub fn library(&self, maven_path: &str) -> PathBuf {
        self.libraries().join(maven_path)
    }

    pub fn games(&self) -> PathBuf {
        self.root.join("games")
    }

    pub fn modpacks(&self) -> PathBuf {
        self.root.join("modpacks")
    }

    /// Scratch space for the running job; wiped at startup and on failure.
    pub fn scratch(&self) -> PathBuf {
        self.root.join(".tmp")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create the top-level directories and remove stale scratch data.
    pub fn prepare(&self) -> InstallResult<()> {
        for dir in [
            self.root.clone(),
            self.versions(),
            self.assets(),
            self.libraries(),
            self.games(),
            self.modpacks(),
        ] {
            ensure_dir(&dir)?;
        }
        self.clear_scratch()
    }

    /// Remove the scratch directory if present.
    pub fn clear_scratch(&self) -> InstallResult<()> {
        let scratch = self.scratch();
        if scratch.exists() {
            debug!(path = %scratch.display(), "Removing scratch directory");
            fs::remove_dir_all(&scratch).map_err(|e| InstallError::WriteFailed {
                path: scratch,
                source: e,
            })?;
        }
        Ok(())
    }
}

/// `create_dir_all` with the error mapped.
pub fn ensure_dir(path: &Path) -> InstallResult<()> {
    fs::create_dir_all(path).map_err(|e| InstallError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
