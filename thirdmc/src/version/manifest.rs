//! Remote listing of published versions.

use serde::{Deserialize, Serialize};

use crate::manager::error::InstallResult;
use crate::manager::traits::{fetch_json, Downloader};

/// `version_manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// One published version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Location of the version descriptor.
    pub url: String,
    #[serde(default)]
    pub release_time: Option<String>,
}

impl VersionEntry {
    pub fn is_release(&self) -> bool {
        self.kind == "release"
    }

    pub fn is_snapshot(&self) -> bool {
        self.kind == "snapshot"
    }
}

impl VersionManifest {
    /// Fetch the listing from `url`.
    pub fn fetch(downloader: &dyn Downloader, url: &str) -> InstallResult<Self> {
        fetch_json(downloader, url)
    }

    /// Releases, plus snapshots when asked. Historic alpha/beta entries are
    /// never listed.
    pub fn installable(&self, include_snapshots: bool) -> impl Iterator<Item = &VersionEntry> {
        self.versions
            .iter()
            .filter(move |v| v.is_release() || (include_snapshots && v.is_snapshot()))
    }

    pub fn find(&self, id: &str) -> Option<&VersionEntry> {
        self.versions.iter().find(|v| v.id == id)
    }
}
