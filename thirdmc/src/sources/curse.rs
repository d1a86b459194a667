//! CurseForge packs.

use std::path::Path;
use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{ContentSource, FileRef, PackManifest, ProjectRef};
use crate::manager::config::Endpoints;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::traits::{Downloader, ProgressCallback};
use crate::profile::{PackageMeta, PackageSource};

/// Required `manifestType` of a pack.
pub const MANIFEST_TYPE: &str = "minecraftModpack";

const MANIFEST_VERSION: u32 = 1;

/// `manifest.json` at the root of a pack archive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseManifest {
    #[serde(default)]
    pub manifest_type: Option<String>,
    #[serde(default)]
    pub manifest_version: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: String,
    pub minecraft: CurseMinecraft,
    #[serde(default)]
    pub files: Vec<CurseFile>,
    #[serde(default)]
    pub overrides: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurseMinecraft {
    pub version: String,
    #[serde(default)]
    pub mod_loaders: Vec<ModLoader>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModLoader {
    pub id: String,
    #[serde(default)]
    pub primary: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CurseFile {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
}

impl CurseManifest {
    /// Parse and validate manifest text.
    pub fn parse(text: &str) -> InstallResult<Self> {
        let manifest: Self = serde_json::from_str(text).map_err(|e| {
            InstallError::UnsupportedFormat(format!("manifest.json is not a pack manifest: {}", e))
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> InstallResult<()> {
        if self.manifest_type.as_deref() != Some(MANIFEST_TYPE) {
            return Err(InstallError::UnsupportedFormat(format!(
                "manifest type {:?} is not {}",
                self.manifest_type, MANIFEST_TYPE
            )));
        }
        if self.manifest_version != Some(MANIFEST_VERSION) {
            return Err(InstallError::UnsupportedFormat(format!(
                "manifest version {:?} is not supported",
                self.manifest_version
            )));
        }
        Ok(())
    }

    /// Forge build from the last `forge-*` loader entry.
    pub fn forge_build(&self) -> Option<String> {
        self.minecraft
            .mod_loaders
            .iter()
            .filter_map(|loader| loader.id.strip_prefix("forge-"))
            .last()
            .map(str::to_string)
    }

    /// Normalize; `url` is the pack address recorded in the metadata.
    pub fn into_pack_manifest(self, url: &str) -> PackManifest {
        let loader = self.forge_build();
        PackManifest {
            minecraft: self.minecraft.version,
            loader,
            files: self
                .files
                .iter()
                .map(|f| FileRef {
                    project: f.project_id,
                    file: f.file_id,
                })
                .collect(),
            overrides: self.overrides,
            meta: PackageMeta {
                name: self.name,
                version: self.version,
                author: self.author,
                url: Some(url.to_string()),
                ..Default::default()
            },
        }
    }
}

fn project_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+-").unwrap())
}

/// Slug from a project page address: last path segment without a leading
/// `<digits>-`, percent-decoded.
pub(crate) fn slug_from_location(location: &str) -> Option<String> {
    let segment = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .rsplit('/')
        .next()?;
    let stripped = project_prefix_pattern().replace(segment, "");
    let slug = percent_decode_str(&stripped).decode_utf8_lossy().into_owned();
    (!slug.is_empty()).then_some(slug)
}

/// [`ContentSource`] for CurseForge.
pub struct CurseSource<'a> {
    downloader: &'a dyn Downloader,
    endpoints: &'a Endpoints,
}

impl<'a> CurseSource<'a> {
    pub fn new(downloader: &'a dyn Downloader, endpoints: &'a Endpoints) -> Self {
        Self {
            downloader,
            endpoints,
        }
    }

    /// Look up the slug of a numeric project id.
    pub fn lookup_slug(&self, project_id: u64) -> InstallResult<String> {
        let url = format!(
            "{}/{}",
            self.endpoints.curse_project_lookup.trim_end_matches('/'),
            project_id
        );
        let location = self
            .downloader
            .redirect_location(&url)?
            .ok_or_else(|| InstallError::NotFound { url: url.clone() })?;
        let slug = slug_from_location(&location).ok_or(InstallError::NotFound { url })?;
        debug!(project_id, slug = %slug, "Resolved project");
        Ok(slug)
    }

    fn project_url(&self, slug: &str) -> String {
        format!(
            "{}/{}",
            self.endpoints.curse_projects.trim_end_matches('/'),
            slug
        )
    }

    /// Download one pack file into `target_dir`.
    pub fn fetch_mod(
        &self,
        file: FileRef,
        target_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let project = self.resolve(&file.project.to_string())?;
        self.fetch_file(&project, &file.file.to_string(), target_dir, progress)
    }

    /// Download the latest archive of the pack at `pack_url`.
    ///
    /// Returns the archive file name inside `target_dir`.
    pub fn fetch_pack(
        &self,
        pack_url: &str,
        target_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let project = self.resolve(pack_url)?;
        let name = self.fetch_file(&project, "latest", target_dir, progress)?;
        if !name.ends_with(".zip") {
            return Err(InstallError::UnsupportedFormat(format!(
                "{} is not a zip archive, most likely not a modpack",
                name
            )));
        }
        Ok(name)
    }
}

impl ContentSource for CurseSource<'_> {
    fn kind(&self) -> PackageSource {
        PackageSource::Curse
    }

    /// Numeric ids are looked up; anything else is a project address.
    fn resolve(&self, source: &str) -> InstallResult<ProjectRef> {
        if let Ok(id) = source.parse::<u64>() {
            let slug = self.lookup_slug(id)?;
            let url = self.project_url(&slug);
            return Ok(ProjectRef { slug, url });
        }
        let slug = slug_from_location(source).ok_or_else(|| {
            InstallError::UnsupportedFormat(format!("{} is not a project address", source))
        })?;
        Ok(ProjectRef {
            slug,
            url: source.trim_end_matches('/').to_string(),
        })
    }

    /// `file` is a numeric file id or `latest`.
    fn fetch_file(
        &self,
        project: &ProjectRef,
        file: &str,
        target_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let url = if file == "latest" {
            format!("{}/files/latest", project.url)
        } else {
            format!("{}/files/{}/download", project.url, file)
        };
        self.downloader.download_named(&url, target_dir, progress)
    }
}
