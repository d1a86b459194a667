//! Loader (Forge) installation support.
//!
//! A loader version is derived from an installed base version: the base
//! directory is copied, its descriptor is patched with the loader's entry
//! point and arguments, and the loader's libraries are appended in the
//! same shape as vanilla libraries so the libraries job can fetch them.

mod forge;

pub use forge::{
    derive_loader_version, forge_version_layout, maven_path, normalize_libraries,
    strip_forge_prefix, universal_jar_url, LoaderLibrary, LoaderProfile,
};
