//! One pipeline per job kind.

mod boot;
mod curse;
mod libraries;
mod loader;
mod package;
mod technic;
mod version;

use super::job::{Continuation, JobSpec, Outcome};
use super::Context;
use crate::manager::error::InstallResult;

pub(crate) fn run(
    ctx: &mut Context<'_, '_>,
    spec: &JobSpec,
    resumed: Option<&Continuation>,
) -> InstallResult<Outcome> {
    match spec {
        JobSpec::Version { id, url, profile } => {
            version::run(ctx, id, url.as_deref(), profile.as_deref())
        }
        JobSpec::Libraries { version } => libraries::run(ctx, version),
        JobSpec::Prelaunch { version, game_dir } => Ok(boot::prelaunch(version, game_dir)),
        JobSpec::Natives { version, game_dir } => boot::natives(ctx, version, game_dir),
        JobSpec::Boot {
            version,
            game_dir,
            natives_dir,
        } => boot::boot(ctx, version, game_dir, natives_dir),
        JobSpec::Loader {
            minecraft,
            build,
            profile,
        } => loader::run(ctx, minecraft, build, profile.as_deref()),
        JobSpec::Package(request) => package::dispatch(request),
        JobSpec::Custom {
            name,
            minecraft,
            forge,
        } => Ok(package::custom(name, minecraft, forge)),
        JobSpec::Curse { url } => curse::run(ctx, url),
        JobSpec::Technic { url } => technic::run(ctx, url, resumed),
    }
}
