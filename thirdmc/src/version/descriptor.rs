//! Version descriptor (`versions/<id>/<id>.json`) types.
//!
//! Unknown fields are kept in `extra` so a descriptor can be rewritten
//! (loader versions are derived by patching a copy) without losing data.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::rules::{applies_to, LibraryRule};
use crate::manager::download::Checksum;
use crate::manager::error::{InstallError, InstallResult};
use crate::platform::Platform;

/// Metadata for one installable version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    pub id: String,

    #[serde(default)]
    pub main_class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndexRef>,

    /// Name of the asset index when no `assetIndex` object is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<VersionDownloads>,

    #[serde(default)]
    pub libraries: Vec<Library>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionDescriptor {
    /// Load a descriptor from disk.
    pub fn load(path: &Path) -> InstallResult<Self> {
        if !path.is_file() {
            return Err(InstallError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| InstallError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| InstallError::json(path.display().to_string(), e))
    }

    /// Write the descriptor as pretty JSON.
    pub fn save(&self, path: &Path) -> InstallResult<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| InstallError::json(path.display().to_string(), e))?;
        std::fs::write(path, text).map_err(|e| InstallError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Asset index name: `assetIndex.id`, else `assets`, else `legacy`.
    pub fn asset_index_name(&self) -> &str {
        self.asset_index
            .as_ref()
            .map(|index| index.id.as_str())
            .or(self.assets.as_deref())
            .unwrap_or("legacy")
    }

    /// Libraries that apply on `platform`, in declaration order.
    pub fn libraries_for(&self, platform: Platform) -> impl Iterator<Item = &Library> {
        self.libraries
            .iter()
            .filter(move |lib| applies_to(&lib.rules, platform))
    }

    /// `release`, `snapshot`, ...; `release` when absent.
    pub fn version_type(&self) -> &str {
        self.kind.as_deref().unwrap_or("release")
    }
}

/// `assetIndex` reference inside a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `downloads` block of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<DownloadRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single downloadable file with an optional digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl DownloadRef {
    pub fn checksum(&self) -> Option<Checksum> {
        self.sha1.as_deref().map(Checksum::sha1)
    }
}

/// One entry of `libraries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Maven coordinate `group:artifact:version`.
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<LibraryRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,

    /// Platform name to classifier suffix, e.g. `linux -> natives-linux`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub natives: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Library {
    /// Main artifact, if the library has one.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.downloads.as_ref().and_then(|d| d.artifact.as_ref())
    }

    /// Whether the library ships a native variant for `platform`.
    pub fn has_natives_for(&self, platform: Platform) -> bool {
        self.natives.contains_key(platform.as_str())
    }

    /// Native classifier artifact for `platform`.
    ///
    /// `Ok(None)` when the library has no natives for the platform; an
    /// error when `natives` names a classifier that `downloads` lacks.
    pub fn native_artifact(&self, platform: Platform) -> InstallResult<Option<&Artifact>> {
        let Some(suffix) = self.natives.get(platform.as_str()) else {
            return Ok(None);
        };
        let classifier = suffix.replace("${arch}", Platform::arch_bits());
        self.downloads
            .as_ref()
            .and_then(|d| d.classifiers.get(&classifier))
            .map(Some)
            .ok_or_else(|| {
                InstallError::UnsupportedFormat(format!(
                    "library {} declares natives {} but has no matching download",
                    self.name, classifier
                ))
            })
    }
}

/// `downloads` block of a library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub classifiers: BTreeMap<String, Artifact>,
}

/// A library file in the Maven-style tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path below `libraries/`.
    pub path: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Served as a `.pack.xz` legacy container next to `url`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub lzma: bool,
}

impl Artifact {
    pub fn checksum(&self) -> Option<Checksum> {
        self.sha1.as_deref().map(Checksum::sha1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::rules::RuleAction;

    const DESCRIPTOR: &str = r#"{
        "id": "1.12.2",
        "type": "release",
        "mainClass": "net.minecraft.client.main.Main",
        "minecraftArguments": "--username ${auth_player_name} --version ${version_name}",
        "assetIndex": {"id": "1.12", "url": "https://example.com/1.12.json", "sha1": "abc", "totalSize": 1},
        "downloads": {"client": {"url": "https://example.com/client.jar", "sha1": "def", "size": 10}},
        "libraries": [
            {"name": "com.mojang:patchy:1.1",
             "downloads": {"artifact": {"path": "com/mojang/patchy/1.1/patchy-1.1.jar",
                                        "url": "https://libraries.example.com/patchy.jar",
                                        "sha1": "aaa", "size": 1}}},
            {"name": "org.lwjgl.lwjgl:lwjgl-platform:2.9.4",
             "natives": {"linux": "natives-linux", "windows": "natives-windows-${arch}"},
             "extract": {"exclude": ["META-INF/"]},
             "rules": [{"action": "allow"}, {"action": "disallow", "os": {"name": "osx"}}],
             "downloads": {"classifiers": {
                "natives-linux": {"path": "l.jar", "url": "https://x/l.jar", "sha1": "bbb"},
                "natives-windows-64": {"path": "w.jar", "url": "https://x/w.jar"}}}}
        ],
        "releaseTime": "2017-09-18T08:39:46+00:00"
    }"#;

    #[test]
    fn test_parse_descriptor() {
        let descriptor: VersionDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();

        assert_eq!(descriptor.id, "1.12.2");
        assert_eq!(descriptor.asset_index_name(), "1.12");
        assert_eq!(descriptor.version_type(), "release");
        assert_eq!(descriptor.libraries.len(), 2);
        assert_eq!(
            descriptor.libraries[1].rules[1].action,
            RuleAction::Disallow
        );
        assert!(descriptor.extra.contains_key("releaseTime"));
    }

    #[test]
    fn test_platform_filtering() {
        let descriptor: VersionDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();

        assert_eq!(descriptor.libraries_for(Platform::Linux).count(), 2);
        assert_eq!(descriptor.libraries_for(Platform::Osx).count(), 1);
    }

    #[test]
    fn test_native_artifact() {
        let descriptor: VersionDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();
        let lib = &descriptor.libraries[1];

        let linux = lib.native_artifact(Platform::Linux).unwrap().unwrap();
        assert_eq!(linux.path, "l.jar");
        assert!(lib.native_artifact(Platform::Osx).unwrap().is_none());
        assert!(descriptor.libraries[0]
            .native_artifact(Platform::Linux)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_native_artifact_inconsistent_metadata() {
        let lib: Library = serde_json::from_str(
            r#"{"name": "a:b:1", "natives": {"linux": "natives-linux"}, "downloads": {}}"#,
        )
        .unwrap();
        assert!(matches!(
            lib.native_artifact(Platform::Linux),
            Err(InstallError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_roundtrip_keeps_unknown_fields() {
        let descriptor: VersionDescriptor = serde_json::from_str(DESCRIPTOR).unwrap();
        let text = serde_json::to_string(&descriptor).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["releaseTime"], "2017-09-18T08:39:46+00:00");
        assert_eq!(value["assetIndex"]["totalSize"], 1);
        assert_eq!(value["type"], "release");
        assert!(value["libraries"][0]["downloads"]["artifact"]
            .get("lzma")
            .is_none());
    }
}
