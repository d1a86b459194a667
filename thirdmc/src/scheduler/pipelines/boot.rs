//! Pre-launch preparation and the hand-off to the launcher.

use std::path::Path;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::launch::LaunchPlan;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::extractor::ZipExtractor;
use crate::manager::layout::ensure_dir;
use crate::scheduler::job::{JobSpec, Outcome};
use crate::scheduler::progress::percent;
use crate::scheduler::Context;
use crate::version::{Library, VersionDescriptor};

const DEFAULT_EXCLUDE: &str = "META-INF/";

/// Make sure libraries are present, then unpack natives.
pub(super) fn prelaunch(version: &str, game_dir: &Path) -> Outcome {
    Outcome::then(vec![
        JobSpec::Libraries {
            version: version.to_string(),
        },
        JobSpec::Natives {
            version: version.to_string(),
            game_dir: game_dir.to_path_buf(),
        },
    ])
}

/// Entries excluded by a library's `extract` rule.
fn extract_excludes(library: &Library) -> Vec<String> {
    let declared: Vec<String> = library
        .extract
        .as_ref()
        .and_then(|extract| extract.get("exclude"))
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if declared.is_empty() {
        vec![DEFAULT_EXCLUDE.to_string()]
    } else {
        declared
    }
}

pub(super) fn natives(
    ctx: &mut Context<'_, '_>,
    version: &str,
    game_dir: &Path,
) -> InstallResult<Outcome> {
    let descriptor = VersionDescriptor::load(&ctx.layout.version_json(version))?;
    let natives_dir = ctx
        .layout
        .version_dir(version)
        .join(format!("natives-{}", Utc::now().timestamp_millis()));
    ensure_dir(&natives_dir)?;

    let native_libraries: Vec<_> = descriptor
        .libraries_for(ctx.platform)
        .filter(|lib| lib.has_natives_for(ctx.platform) && lib.extract.is_some())
        .collect();
    let total = native_libraries.len();

    for (done, library) in native_libraries.into_iter().enumerate() {
        let Some(artifact) = library.native_artifact(ctx.platform)? else {
            continue;
        };
        ctx.progress(&format!("Extracting {}", library.name), percent(done, total));

        let jar = ctx.layout.library(&artifact.path);
        if !jar.is_file() {
            return Err(InstallError::MissingFile { path: jar });
        }
        let extractor = extract_excludes(library)
            .into_iter()
            .fold(ZipExtractor::new(), ZipExtractor::with_exclude);
        let report = extractor.extract(&jar, &natives_dir)?;
        debug!(library = %library.name, files = report.files, "Extracted natives");
    }

    Ok(Outcome::then(vec![JobSpec::Boot {
        version: version.to_string(),
        game_dir: game_dir.to_path_buf(),
        natives_dir,
    }]))
}

pub(super) fn boot(
    ctx: &mut Context<'_, '_>,
    version: &str,
    game_dir: &Path,
    natives_dir: &Path,
) -> InstallResult<Outcome> {
    let descriptor = VersionDescriptor::load(&ctx.layout.version_json(version))?;
    ensure_dir(game_dir)?;

    let plan = LaunchPlan::build(
        ctx.layout,
        ctx.config,
        &descriptor,
        game_dir,
        natives_dir,
        ctx.platform,
    )?;

    let launcher = ctx
        .launcher
        .as_deref_mut()
        .ok_or_else(|| InstallError::Launch("no launcher configured".to_string()))?;
    info!(version = %version, game = %game_dir.display(), "Launching");
    launcher.launch(&plan)?;
    Ok(Outcome::done())
}
