//! Profile persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::records::{InstanceProfile, PackageProfile};
use super::{StoreError, StoreResult};

/// Storage for installed instances and imported packages.
///
/// Mutations are persisted before they return. Removing a profile also
/// deletes its game directory.
pub trait ProfileStore {
    fn list_instances(&self) -> &[InstanceProfile];

    fn list_packages(&self) -> &[PackageProfile];

    /// Insert an instance, replacing one with the same id.
    fn upsert_instance(&mut self, profile: InstanceProfile) -> StoreResult<()>;

    /// Insert a package, replacing one with the same name in place.
    fn upsert_package(&mut self, profile: PackageProfile) -> StoreResult<()>;

    fn remove_instance(&mut self, id: &str) -> StoreResult<Option<InstanceProfile>>;

    fn remove_package(&mut self, id: &str) -> StoreResult<Option<PackageProfile>>;

    fn find_instance(&self, id: &str) -> Option<&InstanceProfile> {
        self.list_instances().iter().find(|p| p.id == id)
    }

    fn find_package(&self, id: &str) -> Option<&PackageProfile> {
        self.list_packages().iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    versions: Vec<InstanceProfile>,
    #[serde(default)]
    modpacks: Vec<PackageProfile>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// [`ProfileStore`] backed by a JSON file.
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
    document: SettingsDocument,
}

impl JsonProfileStore {
    /// Load profiles from `path`; a missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let document = if path.is_file() {
            let text = fs::read_to_string(&path).map_err(|e| StoreError::Read {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&text).map_err(|e| StoreError::Parse {
                path: path.clone(),
                source: e,
            })?
        } else {
            debug!(path = %path.display(), "No profile file yet, starting empty");
            SettingsDocument::default()
        };
        Ok(Self { path, document })
    }

    /// Write the current state back to disk.
    pub fn save(&self) -> StoreResult<()> {
        let text =
            serde_json::to_string_pretty(&self.document).map_err(StoreError::Serialize)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&self.path, text).map_err(|e| StoreError::Write {
            path: self.path.clone(),
            source: e,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn remove_game_dir(path: &Path) -> StoreResult<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).map_err(|e| StoreError::RemoveDir {
            path: path.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

impl ProfileStore for JsonProfileStore {
    fn list_instances(&self) -> &[InstanceProfile] {
        &self.document.versions
    }

    fn list_packages(&self) -> &[PackageProfile] {
        &self.document.modpacks
    }

    fn upsert_instance(&mut self, profile: InstanceProfile) -> StoreResult<()> {
        let instances = &mut self.document.versions;
        match instances.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile,
            None => instances.push(profile),
        }
        self.save()
    }

    fn upsert_package(&mut self, profile: PackageProfile) -> StoreResult<()> {
        let packages = &mut self.document.modpacks;
        match packages.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => {
                info!(package = %profile.name, "Replacing existing package profile");
                *existing = profile;
            }
            None => packages.push(profile),
        }
        self.save()
    }

    fn remove_instance(&mut self, id: &str) -> StoreResult<Option<InstanceProfile>> {
        let Some(index) = self.document.versions.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = self.document.versions.remove(index);
        remove_game_dir(&removed.game)?;
        self.save()?;
        Ok(Some(removed))
    }

    fn remove_package(&mut self, id: &str) -> StoreResult<Option<PackageProfile>> {
        let Some(index) = self.document.modpacks.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        let removed = self.document.modpacks.remove(index);
        remove_game_dir(&removed.game)?;
        self.save()?;
        Ok(Some(removed))
    }
}
