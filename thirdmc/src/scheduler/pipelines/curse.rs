//! CurseForge pack import.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::manager::error::{InstallError, InstallResult};
use crate::manager::extractor::ZipExtractor;
use crate::manager::fs_ops::{merge_overrides, move_path, remove_path};
use crate::manager::layout::ensure_dir;
use crate::manager::traits::ProgressCallback;
use crate::profile::{package_dir_name, PackageProfile};
use crate::scheduler::job::{JobSpec, Outcome};
use crate::scheduler::progress::percent;
use crate::scheduler::Context;
use crate::sources::{ContentSource, CurseManifest, CurseSource, PackManifest};

const MANIFEST_FILE: &str = "manifest.json";

pub(super) fn run(ctx: &mut Context<'_, '_>, url: &str) -> InstallResult<Outcome> {
    let scratch = ctx.layout.scratch();
    ensure_dir(&scratch)?;
    let endpoints = ctx.config.endpoints.clone();
    let source = CurseSource::new(ctx.downloader, &endpoints);

    ctx.progress("Downloading pack", 0.0);
    let archive_name = {
        let kind = ctx.kind;
        let sink = &mut *ctx.sink;
        let mut report = |written: u64, total: u64| sink.transfer(kind, "pack", written, total);
        let callback: ProgressCallback<'_> = &mut report;
        source.fetch_pack(url, &scratch, Some(callback))?
    };

    ctx.progress("Extracting pack", 5.0);
    let archive = scratch.join(&archive_name);
    let extracted = scratch.join("curse-download");
    remove_path(&extracted)?;
    ZipExtractor::new().extract(&archive, &extracted)?;
    remove_path(&archive)?;

    let manifest_path = extracted.join(MANIFEST_FILE);
    let pack = read_manifest(&manifest_path)?.into_pack_manifest(url);
    info!(pack = %pack.meta.name, minecraft = %pack.minecraft, files = pack.files.len(), "Importing pack");

    let game = ctx.layout.games().join(package_dir_name(&pack.meta.name)?);
    clean_game_dir(&game)?;
    let mods = game.join("mods");
    ensure_dir(&mods)?;

    fetch_mods(ctx, &source, &pack, &mods);

    ctx.progress("Applying overrides", 95.0);
    if let Some(overrides) = pack.overrides.as_deref() {
        let overrides = extracted.join(overrides);
        if overrides.is_dir() {
            merge_overrides(&overrides, &game)?;
        }
    }
    move_path(&manifest_path, &game.join(MANIFEST_FILE))?;
    remove_path(&extracted)?;

    let version_id = pack
        .loader_version_id()
        .unwrap_or_else(|| pack.minecraft.clone());
    let follow_up = install_job(ctx, &pack, &version_id);

    let mut profile = PackageProfile::new(
        pack.meta.name.clone(),
        version_id,
        pack.minecraft.clone(),
        game,
        pack.meta.clone(),
        source.kind(),
    );
    if let Some(build) = &pack.loader {
        profile = profile.with_forge(build.clone());
    }
    ctx.store.upsert_package(profile)?;

    Ok(Outcome::then(follow_up.into_iter().collect()))
}

fn read_manifest(path: &Path) -> InstallResult<CurseManifest> {
    let text = fs::read_to_string(path).map_err(|_| {
        InstallError::UnsupportedFormat(
            "manifest.json not found, most likely not a modpack".to_string(),
        )
    })?;
    CurseManifest::parse(&text)
}

/// Drop `config` and `mods` of an earlier import.
pub(super) fn clean_game_dir(game: &Path) -> InstallResult<()> {
    if game.is_dir() {
        remove_path(&game.join("config"))?;
        remove_path(&game.join("mods"))?;
    }
    ensure_dir(game)
}

/// Per-file failures are counted, never fatal.
fn fetch_mods(ctx: &mut Context<'_, '_>, source: &CurseSource<'_>, pack: &PackManifest, mods: &Path) {
    let total = pack.files.len();
    let kind = ctx.kind;

    for (done, file) in pack.files.iter().enumerate() {
        ctx.progress(
            &format!("File {} of {}", done + 1, total),
            10.0 + percent(done, total) * 0.85,
        );

        let sink = &mut *ctx.sink;
        let label = format!("{}/{}", file.project, file.file);
        let mut report = |written: u64, total: u64| sink.transfer(kind, &label, written, total);
        let callback: ProgressCallback<'_> = &mut report;

        match source.fetch_mod(*file, mods, Some(callback)) {
            Ok(name) => debug!(file = %name, "Fetched pack file"),
            Err(e) => {
                warn!(project = file.project, file = file.file, error = %e, "Skipping pack file");
                ctx.skipped += 1;
            }
        }
    }

    if ctx.skipped > 0 {
        ctx.sink.skipped(kind, ctx.skipped);
    }
}

/// Job that installs the version the pack runs on, if it is missing.
fn install_job(ctx: &Context<'_, '_>, pack: &PackManifest, version_id: &str) -> Option<JobSpec> {
    if ctx.layout.version_dir(version_id).is_dir() {
        return None;
    }
    Some(match &pack.loader {
        Some(build) => JobSpec::loader(pack.minecraft.clone(), build.clone()),
        None => JobSpec::version(pack.minecraft.clone()),
    })
}
