//! Launch plan assembly.
//!
//! The boot job turns an installed version into a [`LaunchPlan`]: the
//! command line, working directory and natives directory. Starting the
//! process is left to a [`Launcher`] supplied by the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

use crate::manager::config::InstallerConfig;
use crate::manager::error::InstallResult;
use crate::manager::layout::DataLayout;
use crate::platform::Platform;
use crate::version::VersionDescriptor;

/// Identity passed to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub player_name: String,
    pub uuid: String,
    pub access_token: String,
}

impl Default for Session {
    /// Offline session.
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            uuid: Uuid::nil().simple().to_string(),
            access_token: "0".to_string(),
        }
    }
}

/// Everything needed to start the game process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub java: PathBuf,
    /// JVM options up to and including the classpath.
    pub jvm_args: Vec<String>,
    pub main_class: String,
    pub game_args: Vec<String>,
    /// Game directory; the process runs with it as cwd.
    pub working_dir: PathBuf,
    /// Extracted native libraries, removed once the game exits.
    pub natives_dir: PathBuf,
}

impl LaunchPlan {
    /// Assemble the plan for `descriptor`.
    pub fn build(
        layout: &DataLayout,
        config: &InstallerConfig,
        descriptor: &VersionDescriptor,
        game_dir: &Path,
        natives_dir: &Path,
        platform: Platform,
    ) -> InstallResult<Self> {
        let classpath = classpath(layout, descriptor, platform);

        let mut jvm_args = config.jvm_args.clone();
        jvm_args.push(format!("-Xmx{}G", config.memory_gb));
        jvm_args.push(format!("-Djava.library.path={}", natives_dir.display()));
        jvm_args.push("-cp".to_string());
        jvm_args.push(classpath.join(platform.classpath_separator()));

        let session = &config.session;
        let properties = BTreeMap::from([
            ("auth_player_name", session.player_name.clone()),
            ("version_name", descriptor.id.clone()),
            ("game_directory", game_dir.display().to_string()),
            ("assets_root", layout.assets().display().to_string()),
            ("assets_index_name", descriptor.asset_index_name().to_string()),
            ("auth_uuid", session.uuid.clone()),
            ("auth_access_token", session.access_token.clone()),
            ("user_type", "legacy".to_string()),
            ("version_type", descriptor.version_type().to_string()),
        ]);

        let template = descriptor.minecraft_arguments.as_deref().unwrap_or_default();
        let game_args = template
            .split_whitespace()
            .map(|token| substitute_arguments(token, &properties))
            .collect();

        Ok(Self {
            java: config.java.clone(),
            jvm_args,
            main_class: descriptor.main_class.clone(),
            game_args,
            working_dir: game_dir.to_path_buf(),
            natives_dir: natives_dir.to_path_buf(),
        })
    }

    /// Arguments after the executable.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = self.jvm_args.clone();
        args.push(self.main_class.clone());
        args.extend(self.game_args.iter().cloned());
        args
    }
}

/// Artifacts of applicable libraries in declaration order, then the
/// version jar.
pub fn classpath(layout: &DataLayout, descriptor: &VersionDescriptor, platform: Platform) -> Vec<String> {
    descriptor
        .libraries_for(platform)
        .filter_map(|lib| lib.artifact())
        .map(|artifact| layout.library(&artifact.path).display().to_string())
        .chain(std::iter::once(
            layout.version_jar(&descriptor.id).display().to_string(),
        ))
        .collect()
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(\w+)\}").unwrap())
}

/// Replace `${key}` placeholders; unknown keys become `null`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use thirdmc::launch::substitute_arguments;
///
/// let props = BTreeMap::from([("version_name", "1.12.2".to_string())]);
/// assert_eq!(
///     substitute_arguments("--version ${version_name} --tweak ${tweak}", &props),
///     "--version 1.12.2 --tweak null"
/// );
/// ```
pub fn substitute_arguments(template: &str, properties: &BTreeMap<&str, String>) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            properties
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| "null".to_string())
        })
        .into_owned()
}

/// Starts the game for a finished launch plan.
pub trait Launcher {
    fn launch(&mut self, plan: &LaunchPlan) -> InstallResult<()>;
}
