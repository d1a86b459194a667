//! Package import dispatch.

use crate::manager::error::{InstallError, InstallResult};
use crate::scheduler::job::{JobSpec, Outcome, PackageRequest};

const CURSE_HOST: &str = "curseforge.com";
const TECHNIC_HOST: &str = "api.technicpack.net";

/// Pick the platform job for a package request.
pub(super) fn dispatch(request: &PackageRequest) -> InstallResult<Outcome> {
    let next = match request {
        PackageRequest { url: Some(url), .. } if url.contains(CURSE_HOST) => {
            JobSpec::Curse { url: url.clone() }
        }
        PackageRequest { url: Some(url), .. } if url.contains(TECHNIC_HOST) => {
            JobSpec::Technic { url: url.clone() }
        }
        PackageRequest {
            url: None,
            name: Some(name),
            minecraft: Some(minecraft),
            forge: Some(forge),
        } => JobSpec::Custom {
            name: name.clone(),
            minecraft: minecraft.clone(),
            forge: forge.clone(),
        },
        PackageRequest { url: Some(url), .. } => {
            return Err(InstallError::UnsupportedFormat(format!(
                "unsupported package provider: {}",
                url
            )))
        }
        _ => {
            return Err(InstallError::UnsupportedFormat(
                "a custom package needs a name, game version and loader build".to_string(),
            ))
        }
    };
    Ok(Outcome::then(vec![next]))
}

/// A custom package is a loader install that records a package profile.
pub(super) fn custom(name: &str, minecraft: &str, forge: &str) -> Outcome {
    Outcome::then(vec![JobSpec::Loader {
        minecraft: minecraft.to_string(),
        build: forge.to_string(),
        profile: Some(name.to_string()),
    }])
}
