//! Installed instances and imported packages.
//!
//! Profiles live in `settings.json` in the data directory. The file keeps
//! two lists, `versions` (instances) and `modpacks` (packages); any other
//! top-level keys are preserved on save.

mod naming;
mod records;
mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use naming::{allocate_instance_dir, package_dir_name, sanitize_instance_name};
pub use records::{InstanceProfile, PackageImages, PackageMeta, PackageProfile, PackageSource};
pub use store::{JsonProfileStore, ProfileStore};

/// Result type for profile store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading or persisting profiles.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read profiles from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse profiles in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write profiles to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize profiles: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to remove game directory {}: {source}", path.display())]
    RemoveDir { path: PathBuf, source: io::Error },
}
