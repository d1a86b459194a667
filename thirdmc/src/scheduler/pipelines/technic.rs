//! Technic pack import.

use std::path::Path;

use tracing::info;

use super::curse::clean_game_dir;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::extractor::{read_entry, ZipExtractor};
use crate::manager::fs_ops::remove_path;
use crate::manager::layout::ensure_dir;
use crate::manager::traits::ProgressCallback;
use crate::profile::{package_dir_name, PackageProfile, PackageSource};
use crate::scheduler::job::{Continuation, JobSpec, Outcome};
use crate::scheduler::Context;
use crate::sources::{
    sanitize_loader_version, ContentSource, PackVersionInfo, ProjectRef, TechnicPack,
    TechnicSource,
};

pub(super) fn run(
    ctx: &mut Context<'_, '_>,
    url: &str,
    resumed: Option<&Continuation>,
) -> InstallResult<Outcome> {
    let endpoints = ctx.config.endpoints.clone();
    let source = TechnicSource::new(ctx.downloader, &endpoints);

    if let Some(Continuation::TechnicProfile {
        game,
        pack,
        version_id,
        build,
    }) = resumed
    {
        create_profile(ctx, source.kind(), url, game, pack, version_id, build)?;
        return Ok(Outcome::done());
    }

    ctx.progress("Fetching pack description", 0.0);
    let pack = source.pack(url)?;
    let archive_url = pack.url.clone().ok_or_else(|| {
        InstallError::UnsupportedFormat(format!("pack {} has no download", pack.name))
    })?;

    let game = ctx.layout.games().join(package_dir_name(&pack.name)?);
    clean_game_dir(&game)?;

    ctx.progress("Downloading pack", 10.0);
    let scratch = ctx.layout.scratch();
    ensure_dir(&scratch)?;
    let project = ProjectRef {
        slug: pack.name.clone(),
        url: url.to_string(),
    };
    let archive_name = {
        let kind = ctx.kind;
        let sink = &mut *ctx.sink;
        let mut report = |written: u64, total: u64| sink.transfer(kind, "pack", written, total);
        let callback: ProgressCallback<'_> = &mut report;
        source.fetch_file(&project, &archive_url, &scratch, Some(callback))?
    };

    ctx.progress("Extracting pack", 60.0);
    let archive = scratch.join(archive_name);
    ZipExtractor::new().extract(&archive, &game)?;
    remove_path(&archive)?;

    let info = read_version_info(&game)?;
    let minecraft = info.jar.clone().unwrap_or_else(|| pack.minecraft.clone());
    let build = sanitize_loader_version(&info.id, &minecraft);
    let version_id = info.id;
    info!(pack = %pack.name, loader = %version_id, build = %build, "Pack extracted");

    if !ctx.layout.version_dir(&version_id).is_dir() {
        return Ok(Outcome::Requires {
            prerequisites: vec![JobSpec::loader(minecraft, build.clone())],
            continuation: Continuation::TechnicProfile {
                game,
                pack,
                version_id,
                build,
            },
        });
    }

    create_profile(ctx, source.kind(), url, &game, &pack, &version_id, &build)?;
    Ok(Outcome::done())
}

/// `version.json` of `bin/modpack.jar`; the game directory is removed
/// when the pack is not in a supported layout.
fn read_version_info(game: &Path) -> InstallResult<PackVersionInfo> {
    let jar = game.join("bin").join("modpack.jar");
    if !jar.is_file() {
        remove_path(game)?;
        return Err(InstallError::UnsupportedFormat(
            "unrecognized packing format".to_string(),
        ));
    }

    let parsed = read_entry(&jar, "version.json")?
        .and_then(|bytes| serde_json::from_slice::<PackVersionInfo>(&bytes).ok());
    match parsed {
        Some(info) => Ok(info),
        None => {
            remove_path(game)?;
            Err(InstallError::UnsupportedFormat(
                "invalid or missing version.json, the pack might use a legacy mod loader"
                    .to_string(),
            ))
        }
    }
}

fn create_profile(
    ctx: &mut Context<'_, '_>,
    origin: PackageSource,
    url: &str,
    game: &Path,
    pack: &TechnicPack,
    version_id: &str,
    build: &str,
) -> InstallResult<()> {
    let profile = PackageProfile::new(
        pack.name.clone(),
        version_id,
        pack.minecraft.clone(),
        game,
        pack.meta(url),
        origin,
    )
    .with_forge(build);
    ctx.store.upsert_package(profile)?;
    Ok(())
}
