//! Third-party content platforms.
//!
//! Each platform is a [`ContentSource`]: it resolves an upstream address
//! to a project and fetches files of that project. What a pack contains is
//! normalized into a [`PackManifest`] so the import jobs only deal with one
//! shape.

mod curse;
mod technic;

use std::path::Path;

pub use curse::{CurseFile, CurseManifest, CurseMinecraft, CurseSource, ModLoader, MANIFEST_TYPE};
pub use technic::{sanitize_loader_version, PackVersionInfo, TechnicPack, TechnicSource};

use crate::manager::error::InstallResult;
use crate::manager::traits::ProgressCallback;
use crate::profile::{PackageMeta, PackageSource};

/// A project on a content platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// Short project name (curse slug, technic pack name).
    pub slug: String,
    /// Address files of the project are resolved against.
    pub url: String,
}

/// One content file of a pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRef {
    pub project: u64,
    pub file: u64,
}

/// Platform-independent description of a pack.
#[derive(Debug, Clone, PartialEq)]
pub struct PackManifest {
    pub minecraft: String,
    /// Loader build, e.g. `14.23.5.2847`.
    pub loader: Option<String>,
    pub files: Vec<FileRef>,
    /// Directory inside the pack archive merged over the game directory.
    pub overrides: Option<String>,
    pub meta: PackageMeta,
}

impl PackManifest {
    /// Version id the loader job creates: `<mc>-forge<mc>-<build>`.
    pub fn loader_version_id(&self) -> Option<String> {
        self.loader
            .as_ref()
            .map(|build| format!("{0}-forge{0}-{1}", self.minecraft, build))
    }
}

/// A platform that serves pack content.
pub trait ContentSource {
    fn kind(&self) -> PackageSource;

    /// Turn an upstream address (or platform id) into a project.
    fn resolve(&self, source: &str) -> InstallResult<ProjectRef>;

    /// Fetch `file` of `project` into `target_dir`, returning the file name.
    fn fetch_file(
        &self,
        project: &ProjectRef,
        file: &str,
        target_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_version_id() {
        let manifest = PackManifest {
            minecraft: "1.12.2".to_string(),
            loader: Some("14.23.5.2847".to_string()),
            files: Vec::new(),
            overrides: None,
            meta: PackageMeta::default(),
        };
        assert_eq!(
            manifest.loader_version_id().as_deref(),
            Some("1.12.2-forge1.12.2-14.23.5.2847")
        );
    }
}
