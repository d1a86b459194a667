//! Technic Platform packs.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ContentSource, ProjectRef};
use crate::manager::config::Endpoints;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::traits::{fetch_json, Downloader, ProgressCallback};
use crate::profile::{PackageImages, PackageMeta, PackageSource};

/// Pack description returned by the platform API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicPack {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub minecraft: String,
    /// Pack archive.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub platform_url: Option<String>,
    #[serde(default)]
    pub discord_server_id: Option<String>,
    #[serde(default)]
    pub icon: Option<Value>,
    #[serde(default)]
    pub logo: Option<Value>,
    #[serde(default)]
    pub background: Option<Value>,
    #[serde(default)]
    pub solder: Option<Value>,
}

/// Images come either as plain URLs or as `{"url": ..}` objects.
fn image_url(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(map) => map
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

impl TechnicPack {
    pub fn uses_solder(&self) -> bool {
        match &self.solder {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Profile metadata; `source_url` is the API address of the pack.
    pub fn meta(&self, source_url: &str) -> PackageMeta {
        PackageMeta {
            name: self.display_name.clone().unwrap_or_else(|| self.name.clone()),
            version: self.version.clone().unwrap_or_default(),
            author: self.user.clone().unwrap_or_default(),
            url: Some(source_url.to_string()),
            view_url: self.platform_url.clone(),
            discord: self.discord_server_id.clone(),
            images: Some(PackageImages {
                icon: image_url(&self.icon),
                logo: image_url(&self.logo),
                background: image_url(&self.background),
            }),
        }
    }
}

/// `version.json` inside `bin/modpack.jar`.
#[derive(Debug, Clone, Deserialize)]
pub struct PackVersionInfo {
    pub id: String,
    #[serde(default)]
    pub jar: Option<String>,
}

/// Loader build from the version id a pack ships.
///
/// Packs name their loader in several ways: `1.7.10-Forge10.13.4.1614-1.7.10`,
/// `1.12.2-forge1.12.2-14.23.5.2847`, or a bare build.
pub fn sanitize_loader_version(id: &str, minecraft: &str) -> String {
    let mut version = id
        .strip_prefix(&format!("{}-", minecraft))
        .unwrap_or(id)
        .to_string();

    if let Some(rest) = version.strip_prefix("Forge") {
        version = rest.replacen(&format!("-{}", minecraft), "", 1);
    }
    let forge_mc = format!("forge{}", minecraft);
    if version.starts_with(&forge_mc) {
        version = version.get(forge_mc.len() + 1..).unwrap_or_default().to_string();
    }
    version
}

/// [`ContentSource`] for the Technic Platform.
pub struct TechnicSource<'a> {
    downloader: &'a dyn Downloader,
    endpoints: &'a Endpoints,
}

impl<'a> TechnicSource<'a> {
    pub fn new(downloader: &'a dyn Downloader, endpoints: &'a Endpoints) -> Self {
        Self {
            downloader,
            endpoints,
        }
    }

    /// Current stable launcher build; the API answers per build.
    pub fn latest_build(&self) -> InstallResult<u64> {
        let url = format!(
            "{}/launcher/version/stable4",
            self.endpoints.technic_api.trim_end_matches('/')
        );
        let body: Value = fetch_json(self.downloader, &url)?;
        let build = match body.get("build") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };
        build.ok_or_else(|| {
            InstallError::UnsupportedFormat("Technic Platform is currently unsupported".to_string())
        })
    }

    /// Fetch the pack description at `pack_url`.
    pub fn pack(&self, pack_url: &str) -> InstallResult<TechnicPack> {
        let build = self.latest_build()?;
        let url = format!("{}?build={}", pack_url, build);
        let body: Value = fetch_json(self.downloader, &url)?;
        if body.get("error").is_some() {
            return Err(InstallError::NotFound {
                url: pack_url.to_string(),
            });
        }
        let pack: TechnicPack =
            serde_json::from_value(body).map_err(|e| InstallError::json(url.as_str(), e))?;
        if pack.uses_solder() {
            return Err(InstallError::UnsupportedFormat(
                "Solder packs are not supported".to_string(),
            ));
        }
        debug!(pack = %pack.name, minecraft = %pack.minecraft, build, "Fetched pack description");
        Ok(pack)
    }
}

impl ContentSource for TechnicSource<'_> {
    fn kind(&self) -> PackageSource {
        PackageSource::Technic
    }

    fn resolve(&self, source: &str) -> InstallResult<ProjectRef> {
        let pack = self.pack(source)?;
        Ok(ProjectRef {
            slug: pack.name,
            url: source.to_string(),
        })
    }

    /// `file` is the archive address; it is saved as `<slug>.zip`.
    fn fetch_file(
        &self,
        project: &ProjectRef,
        file: &str,
        target_dir: &Path,
        progress: Option<ProgressCallback<'_>>,
    ) -> InstallResult<String> {
        let name = format!("{}.zip", project.slug);
        self.downloader
            .download(file, &target_dir.join(&name), None, progress)?;
        Ok(name)
    }
}
