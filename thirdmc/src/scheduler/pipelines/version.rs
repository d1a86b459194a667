//! Game version install: descriptor, assets and client jar.

use std::fs;

use tracing::{debug, info};

use crate::manager::download::Checksum;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::layout::ensure_dir;
use crate::profile::{allocate_instance_dir, InstanceProfile};
use crate::scheduler::job::{JobSpec, Outcome};
use crate::scheduler::progress::percent;
use crate::scheduler::Context;
use crate::version::{AssetIndex, VersionDescriptor, VersionManifest};

pub(super) fn run(
    ctx: &mut Context<'_, '_>,
    id: &str,
    url: Option<&str>,
    profile: Option<&str>,
) -> InstallResult<Outcome> {
    ctx.progress("Resolving version metadata", 0.0);
    let url = match url {
        Some(url) => url.to_string(),
        None => lookup_url(ctx, id)?,
    };

    let descriptor = write_descriptor(ctx, id, &url)?;
    fetch_assets(ctx, &descriptor)?;
    fetch_client(ctx, &descriptor)?;

    if let Some(name) = profile {
        create_instance(ctx, name, &descriptor)?;
    }

    info!(version = %id, "Version installed");
    Ok(Outcome::then(vec![JobSpec::Libraries {
        version: id.to_string(),
    }]))
}

fn lookup_url(ctx: &Context<'_, '_>, id: &str) -> InstallResult<String> {
    let manifest_url = &ctx.config.endpoints.version_manifest;
    let manifest = VersionManifest::fetch(ctx.downloader, manifest_url)?;
    manifest
        .find(id)
        .map(|entry| entry.url.clone())
        .ok_or_else(|| InstallError::NotFound {
            url: format!("{} ({})", manifest_url, id),
        })
}

fn write_descriptor(ctx: &mut Context<'_, '_>, id: &str, url: &str) -> InstallResult<VersionDescriptor> {
    let text = ctx.downloader.get_text(url)?;
    let descriptor: VersionDescriptor =
        serde_json::from_str(&text).map_err(|e| InstallError::json(url, e))?;

    let path = ctx.layout.version_json(id);
    ensure_dir(&ctx.layout.version_dir(id))?;
    fs::write(&path, &text).map_err(|e| InstallError::WriteFailed {
        path: path.clone(),
        source: e,
    })?;
    debug!(path = %path.display(), "Wrote version descriptor");
    Ok(descriptor)
}

fn fetch_assets(ctx: &mut Context<'_, '_>, descriptor: &VersionDescriptor) -> InstallResult<()> {
    let Some(index_ref) = descriptor.asset_index.as_ref() else {
        debug!(version = %descriptor.id, "No asset index declared");
        return Ok(());
    };

    ctx.progress("Fetching asset index", 5.0);
    let index_path = ctx.layout.asset_index(&index_ref.id);
    let expected = index_ref.sha1.as_deref().map(Checksum::sha1);
    ctx.fetch(&index_ref.url, &index_path, expected.as_ref())?;

    let text = fs::read_to_string(&index_path).map_err(|e| InstallError::ReadFailed {
        path: index_path.clone(),
        source: e,
    })?;
    let index: AssetIndex =
        serde_json::from_str(&text).map_err(|e| InstallError::json(index_ref.id.as_str(), e))?;

    let objects = index.unique_objects();
    let total = objects.len();
    let mut fetched = 0usize;
    for (done, object) in objects.into_iter().enumerate() {
        if done % 100 == 0 {
            ctx.progress(
                &format!("Assets {}/{}", done, total),
                5.0 + percent(done, total) * 0.8,
            );
        }
        let dest = ctx.layout.asset_object(&object.hash);
        let url = object.url(&ctx.config.endpoints.resources);
        if ctx
            .fetch(&url, &dest, Some(&Checksum::sha1(&object.hash)))?
            .was_downloaded()
        {
            fetched += 1;
        }
    }
    info!(index = %index_ref.id, objects = total, fetched, "Assets ready");
    Ok(())
}

fn fetch_client(ctx: &mut Context<'_, '_>, descriptor: &VersionDescriptor) -> InstallResult<()> {
    let client = descriptor
        .downloads
        .as_ref()
        .and_then(|d| d.client.as_ref())
        .ok_or_else(|| {
            InstallError::UnsupportedFormat(format!(
                "version {} has no client download",
                descriptor.id
            ))
        })?;

    ctx.progress("Fetching client", 90.0);
    let jar = ctx.layout.version_jar(&descriptor.id);
    ctx.fetch(&client.url, &jar, client.checksum().as_ref())?;
    Ok(())
}

fn create_instance(
    ctx: &mut Context<'_, '_>,
    name: &str,
    descriptor: &VersionDescriptor,
) -> InstallResult<()> {
    let game = allocate_instance_dir(&ctx.layout.games(), name)?;
    ensure_dir(&game)?;
    let profile = InstanceProfile::new(name, &descriptor.id, &descriptor.id, &game);
    info!(instance = %name, game = %game.display(), "Creating instance");
    ctx.store.upsert_instance(profile)?;
    Ok(())
}
