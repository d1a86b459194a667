//! Version metadata: descriptors, platform rules, the remote version
//! listing and asset indexes.

mod assets;
mod descriptor;
mod manifest;
pub mod rules;

pub use assets::{AssetIndex, AssetObject};
pub use descriptor::{
    Artifact, AssetIndexRef, DownloadRef, Library, LibraryDownloads, VersionDescriptor,
    VersionDownloads,
};
pub use manifest::{LatestVersions, VersionEntry, VersionManifest};
pub use rules::{applies_to, LibraryRule, OsRule, RuleAction};
