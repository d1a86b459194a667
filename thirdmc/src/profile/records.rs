//! Persisted profile records.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A vanilla (or loader) version installed under a name with its own
/// game directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub id: String,
    pub name: String,
    /// Version id under `versions/` that is launched.
    pub version: String,
    pub mcversion: String,
    pub game: PathBuf,
    pub added: DateTime<Utc>,
}

impl InstanceProfile {
    /// Create a profile with a fresh id, added now.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        mcversion: impl Into<String>,
        game: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            version: version.into(),
            mcversion: mcversion.into(),
            game: game.into(),
            added: Utc::now(),
        }
    }
}

/// Where an imported package came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageSource {
    Curse,
    Technic,
    Custom,
}

impl PackageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Curse => "curse",
            Self::Technic => "technic",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for PackageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artwork advertised by a package platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Display metadata of a package.
///
/// `url` is the upstream address the package was imported from and is
/// what a reinstall fetches again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<PackageImages>,
}

/// An imported content package bound to a loader version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageProfile {
    pub id: String,
    pub name: String,
    /// Loader version id under `versions/` that is launched.
    pub version: String,
    pub mcversion: String,
    pub game: PathBuf,
    /// Loader build the package was created with, without `forge-`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forge: Option<String>,
    pub meta: PackageMeta,
    pub source: PackageSource,
    pub added: DateTime<Utc>,
}

impl PackageProfile {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        mcversion: impl Into<String>,
        game: impl Into<PathBuf>,
        meta: PackageMeta,
        source: PackageSource,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            version: version.into(),
            mcversion: mcversion.into(),
            game: game.into(),
            forge: None,
            meta,
            source,
            added: Utc::now(),
        }
    }

    pub fn with_forge(mut self, forge: impl Into<String>) -> Self {
        self.forge = Some(forge.into());
        self
    }
}
