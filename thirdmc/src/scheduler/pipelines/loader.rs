//! Loader install on top of a base version.

use tracing::info;

use crate::loader::{
    derive_loader_version, forge_version_layout, normalize_libraries, strip_forge_prefix,
    universal_jar_url, LoaderProfile,
};
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::extractor::read_entry;
use crate::manager::fs_ops::remove_path;
use crate::manager::layout::ensure_dir;
use crate::profile::{package_dir_name, PackageMeta, PackageProfile, PackageSource};
use crate::scheduler::job::{Continuation, JobSpec, Outcome};
use crate::scheduler::Context;

pub(super) fn run(
    ctx: &mut Context<'_, '_>,
    minecraft: &str,
    build: &str,
    profile: Option<&str>,
) -> InstallResult<Outcome> {
    if !ctx.layout.version_dir(minecraft).is_dir() {
        return Ok(Outcome::Requires {
            prerequisites: vec![JobSpec::version(minecraft)],
            continuation: Continuation::Restart,
        });
    }

    let build = strip_forge_prefix(build);
    let layout_name = forge_version_layout(minecraft, build);
    let url = universal_jar_url(&ctx.config.endpoints.loader_maven, &layout_name);

    ctx.progress("Fetching loader", 0.0);
    let scratch = ctx.layout.scratch();
    ensure_dir(&scratch)?;
    let jar = scratch.join(format!("forge-{}-universal.jar", layout_name));
    ctx.fetch(&url, &jar, None)?;

    ctx.progress("Reading loader profile", 50.0);
    let loader = read_profile(&jar);
    remove_path(&jar)?;
    let loader = loader?;

    let libraries = normalize_libraries(&loader.libraries, &ctx.config.endpoints.libraries)?;
    let id = derive_loader_version(ctx.layout, minecraft, &loader, libraries)?;

    if let Some(name) = profile {
        create_package(ctx, name, &id, minecraft, build)?;
    }

    info!(loader = %id, "Loader installed");
    Ok(Outcome::then(vec![JobSpec::Libraries { version: id }]))
}

fn read_profile(jar: &std::path::Path) -> InstallResult<LoaderProfile> {
    let bytes = read_entry(jar, "version.json")?.ok_or_else(|| {
        InstallError::UnsupportedFormat(format!(
            "{} has no version.json",
            jar.file_name().unwrap_or_default().to_string_lossy()
        ))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| InstallError::json("loader version.json", e))
}

fn create_package(
    ctx: &mut Context<'_, '_>,
    name: &str,
    version_id: &str,
    minecraft: &str,
    build: &str,
) -> InstallResult<()> {
    let game = ctx.layout.games().join(package_dir_name(name)?);
    ensure_dir(&game)?;

    let meta = PackageMeta {
        name: name.to_string(),
        version: "custom".to_string(),
        author: ctx.config.session.player_name.clone(),
        ..Default::default()
    };
    let profile = PackageProfile::new(name, version_id, minecraft, game, meta, PackageSource::Custom)
        .with_forge(build);
    ctx.store.upsert_package(profile)?;
    Ok(())
}
