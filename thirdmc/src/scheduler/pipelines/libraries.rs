//! Library download for an installed version.

use tracing::{debug, info, warn};

use crate::manager::error::{InstallError, InstallResult};
use crate::manager::fs_ops::remove_path;
use crate::manager::layout::ensure_dir;
use crate::manager::legacy_pack::LegacyPackDecoder;
use crate::scheduler::job::Outcome;
use crate::scheduler::progress::percent;
use crate::scheduler::Context;
use crate::version::{Artifact, VersionDescriptor};

pub(super) fn run(ctx: &mut Context<'_, '_>, version: &str) -> InstallResult<Outcome> {
    let descriptor = VersionDescriptor::load(&ctx.layout.version_json(version))?;
    let libraries: Vec<_> = descriptor.libraries_for(ctx.platform).collect();
    let total = libraries.len();

    for (done, library) in libraries.into_iter().enumerate() {
        ctx.progress(&library.name, percent(done, total));

        if let Some(artifact) = library.artifact() {
            fetch_library(ctx, artifact)?;
        }
        if let Some(native) = library.native_artifact(ctx.platform)? {
            fetch_library(ctx, native)?;
        }
    }

    info!(version = %version, libraries = total, "Libraries ready");
    Ok(Outcome::done())
}

fn fetch_library(ctx: &mut Context<'_, '_>, artifact: &Artifact) -> InstallResult<()> {
    if artifact.url.is_empty() {
        debug!(path = %artifact.path, "Library has no download location");
        return Ok(());
    }
    if artifact.lzma {
        return fetch_legacy_pack(ctx, artifact);
    }

    let dest = ctx.layout.library(&artifact.path);
    let expected = artifact.checksum();
    match ctx.fetch(&artifact.url, &dest, expected.as_ref()) {
        Err(e) if e.is_checksum_mismatch() => {
            warn!(path = %artifact.path, error = %e, "Checksum mismatch, downloading again");
            ctx.fetch(&artifact.url, &dest, expected.as_ref())
                .map_err(into_drift)?;
        }
        other => {
            other?;
        }
    }
    Ok(())
}

/// A second mismatch means the remote file itself changed.
fn into_drift(error: InstallError) -> InstallError {
    match error {
        InstallError::ChecksumMismatch {
            file,
            expected,
            actual,
        } => InstallError::RemoteContentDrifted {
            file,
            expected,
            actual,
        },
        other => other,
    }
}

/// Libraries served as `.pack.xz` carry no direct digest; their content
/// is checked against the container's own manifest when decoded, so an
/// existing jar is kept.
fn fetch_legacy_pack(ctx: &mut Context<'_, '_>, artifact: &Artifact) -> InstallResult<()> {
    let jar = ctx.layout.library(&artifact.path);
    if jar.is_file() {
        debug!(path = %artifact.path, "Legacy pack library present");
        return Ok(());
    }

    let scratch = ctx.layout.scratch();
    ensure_dir(&scratch)?;
    let file_name = artifact.path.rsplit('/').next().unwrap_or(&artifact.path);
    let container = scratch.join(format!("{}.pack.xz", file_name));

    ctx.fetch(&format!("{}.pack.xz", artifact.url), &container, None)?;
    let result = LegacyPackDecoder::new(ctx.unpacker, &scratch).decode(&container, &jar);
    remove_path(&container)?;
    result.map(|records| {
        debug!(path = %artifact.path, records, "Legacy pack decoded");
    })
}
