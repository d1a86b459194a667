use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Map;
use tracing::{debug, info};

use crate::manager::error::{InstallError, InstallResult};
use crate::manager::fs_ops::{copy_dir_recursive, remove_path};
use crate::manager::layout::DataLayout;
use crate::version::{Artifact, Library, LibraryDownloads, VersionDescriptor};

/// `version.json` embedded in a loader's universal jar.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderProfile {
    pub id: String,
    /// Base version the loader patches.
    #[serde(default)]
    pub jar: Option<String>,
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    pub main_class: String,
    #[serde(default)]
    pub libraries: Vec<LoaderLibrary>,
}

/// Library entry in loader format.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderLibrary {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub checksums: Option<Vec<String>>,
    #[serde(default)]
    pub serverreq: Option<bool>,
    #[serde(default)]
    pub clientreq: Option<bool>,
}

impl LoaderLibrary {
    /// Only an explicit `clientreq: false` keeps a library off the client.
    /// `serverreq` alone says nothing about the client: launchwrapper and
    /// asm-all are shipped that way.
    fn is_client_library(&self) -> bool {
        self.clientreq != Some(false)
    }
}

/// Drop a leading `forge-` from a loader version.
pub fn strip_forge_prefix(version: &str) -> &str {
    version.strip_prefix("forge-").unwrap_or(version)
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Maven directory name of a loader build.
///
/// Builds for 1.7 and 1.8 (and 1.9 without a patch number) carry the
/// base version a second time: `1.7.10-10.13.4.1614-1.7.10`,
/// `1.8-11.14.4.1577-1.8.0`. Everything else is `<mc>-<forge>`.
pub fn forge_version_layout(minecraft: &str, forge: &str) -> String {
    let layout = format!("{}-{}", minecraft, forge);
    let parts: Vec<u32> = number_pattern()
        .find_iter(minecraft)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();

    match (parts.get(1), parts.get(2)) {
        (Some(9), Some(_)) => layout,
        (Some(minor), patch) if (7..=9).contains(minor) => {
            let trailing = if patch.is_some() {
                minecraft.to_string()
            } else {
                format!("{}.0", minecraft)
            };
            format!("{}-{}", layout, trailing)
        }
        _ => layout,
    }
}

/// URL of the universal jar for a layout under the loader maven base.
pub fn universal_jar_url(maven_base: &str, layout: &str) -> String {
    format!(
        "{}/{}/forge-{}-universal.jar",
        maven_base.trim_end_matches('/'),
        layout,
        layout
    )
}

/// Maven-style path for `group:artifact:version[:classifier]`.
pub fn maven_path(name: &str) -> InstallResult<String> {
    maven_path_with(name, None)
}

fn maven_path_with(name: &str, classifier_override: Option<&str>) -> InstallResult<String> {
    let parts: Vec<&str> = name.split(':').collect();
    if parts.len() < 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(InstallError::UnsupportedFormat(format!(
            "library name {:?} is not a group:artifact:version coordinate",
            name
        )));
    }
    let (group, artifact, version) = (parts[0], parts[1], parts[2]);
    let classifier = classifier_override.or(parts.get(3).copied());

    let file = match classifier {
        Some(c) => format!("{}-{}-{}.jar", artifact, version, c),
        None => format!("{}-{}.jar", artifact, version),
    };
    Ok(format!(
        "{}/{}/{}/{}",
        group.replace('.', "/"),
        artifact,
        version,
        file
    ))
}

/// Translate loader libraries into vanilla-shaped libraries.
///
/// Libraries without a repository URL come from `vanilla_base`. The loader
/// artifact itself is fetched as its `-universal` jar. Entries with more
/// than one checksum are served as legacy pack containers and carry no
/// direct digest.
pub fn normalize_libraries(
    libraries: &[LoaderLibrary],
    vanilla_base: &str,
) -> InstallResult<Vec<Library>> {
    let mut normalized = Vec::new();

    for lib in libraries.iter().filter(|lib| lib.is_client_library()) {
        let path = maven_path(&lib.name)?;
        let artifact_name = lib.name.split(':').nth(1).unwrap_or_default();

        let url = match lib.url.as_deref() {
            Some(repo) if artifact_name == "forge" => {
                format!("{}{}", repo, maven_path_with(&lib.name, Some("universal"))?)
            }
            Some(repo) => format!("{}{}", repo, path),
            None => format!("{}{}", vanilla_base, path),
        };

        let (sha1, lzma) = match lib.checksums.as_deref() {
            Some([single]) => (Some(single.to_lowercase()), false),
            Some(many) if many.len() > 1 => (None, true),
            _ => (None, false),
        };

        normalized.push(Library {
            name: lib.name.clone(),
            rules: Vec::new(),
            downloads: Some(LibraryDownloads {
                artifact: Some(Artifact {
                    path,
                    url,
                    sha1,
                    size: None,
                    lzma,
                }),
                classifiers: Default::default(),
            }),
            natives: Default::default(),
            extract: None,
            extra: Map::new(),
        });
    }

    debug!(
        declared = libraries.len(),
        kept = normalized.len(),
        "Normalized loader libraries"
    );
    Ok(normalized)
}

/// Create `versions/<loader id>` from the installed base version.
///
/// Any previous directory of the same id is replaced. Returns the loader
/// version id.
pub fn derive_loader_version(
    layout: &DataLayout,
    base: &str,
    profile: &LoaderProfile,
    libraries: Vec<Library>,
) -> InstallResult<String> {
    let base_dir = layout.version_dir(base);
    if !base_dir.is_dir() {
        return Err(InstallError::MissingFile { path: base_dir });
    }

    let id = profile.id.clone();
    let target = layout.version_dir(&id);
    remove_path(&target)?;
    copy_dir_recursive(&base_dir, &target)?;

    rename_in(&target, &format!("{}.json", base), &format!("{}.json", id))?;
    rename_in(&target, &format!("{}.jar", base), &format!("{}.jar", id))?;

    let json = layout.version_json(&id);
    let mut descriptor = VersionDescriptor::load(&json)?;
    descriptor.id = id.clone();
    descriptor.main_class = profile.main_class.clone();
    if let Some(arguments) = &profile.minecraft_arguments {
        descriptor.minecraft_arguments = Some(arguments.clone());
    }
    descriptor.libraries.extend(libraries);
    descriptor.save(&json)?;

    info!(loader = %id, base = %base, "Created loader version");
    Ok(id)
}

fn rename_in(dir: &Path, from: &str, to: &str) -> InstallResult<()> {
    let source = dir.join(from);
    if !source.exists() {
        return Ok(());
    }
    let dest = dir.join(to);
    fs::rename(&source, &dest).map_err(|e| InstallError::WriteFailed { path: dest, source: e })
}
