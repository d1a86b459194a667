//! Modpack commands: install from a URL, create, reinstall, list, remove.

use clap::Subcommand;
use console::style;
use thirdmc::profile::{PackageProfile, ProfileStore};
use thirdmc::scheduler::{JobSpec, PackageRequest};

use super::common::{confirm, find_by_id, print_summary, short_id};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Packs subcommands.
#[derive(Debug, Subcommand)]
pub enum PacksCommands {
    /// Import a pack from a CurseForge project or Technic API address
    Install {
        /// Pack address
        url: String,
    },

    /// Create a custom pack on a loader build
    Create {
        /// Pack name
        #[arg(long)]
        name: String,

        /// Game version (e.g., 1.12.2)
        #[arg(long)]
        mc: String,

        /// Loader build (e.g., 14.23.5.2847)
        #[arg(long)]
        forge: String,
    },

    /// Import a pack again from where it came from
    Reinstall {
        /// Package id (a unique prefix is enough)
        id: String,
    },

    /// List installed packs
    List,

    /// Remove a pack and its game directory
    Remove {
        /// Package id (a unique prefix is enough)
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run a packs subcommand.
pub fn run(runner: &CliRunner, command: PacksCommands) -> Result<(), CliError> {
    match command {
        PacksCommands::Install { url } => install(runner, PackageRequest::from_url(url)),
        PacksCommands::Create { name, mc, forge } => {
            install(runner, PackageRequest::custom(name, mc, forge))
        }
        PacksCommands::Reinstall { id } => run_reinstall(runner, &id),
        PacksCommands::List => run_list(runner),
        PacksCommands::Remove { id, yes } => run_remove(runner, &id, yes),
    }
}

fn install(runner: &CliRunner, request: PackageRequest) -> Result<(), CliError> {
    let summary = runner.run_jobs(vec![JobSpec::Package(request)])?;
    print_summary(&summary);
    Ok(())
}

fn find_package(store: &dyn ProfileStore, query: &str) -> Result<PackageProfile, CliError> {
    find_by_id(store.list_packages(), |p| p.id.as_str(), query)?
        .cloned()
        .ok_or_else(|| CliError::UnknownProfile(query.to_string()))
}

/// Request that rebuilds `package`: its upstream address, or for custom
/// packs the name, game version and loader build.
pub fn reinstall_request(package: &PackageProfile) -> Result<PackageRequest, CliError> {
    if let Some(url) = &package.meta.url {
        return Ok(PackageRequest::from_url(url.clone()));
    }
    let forge = package.forge.clone().ok_or_else(|| {
        CliError::Config(format!(
            "package '{}' has no source address or loader build to reinstall from",
            package.name
        ))
    })?;
    Ok(PackageRequest::custom(
        package.name.clone(),
        package.mcversion.clone(),
        forge,
    ))
}

fn run_reinstall(runner: &CliRunner, query: &str) -> Result<(), CliError> {
    let package = find_package(&runner.store()?, query)?;
    let request = reinstall_request(&package)?;
    println!("Reinstalling {}", style(&package.name).cyan().bold());
    install(runner, request)
}

fn run_list(runner: &CliRunner) -> Result<(), CliError> {
    let store = runner.store()?;
    let packages = store.list_packages();

    if packages.is_empty() {
        println!("No packs installed. Use 'thirdmc packs install <url>' or 'thirdmc packs create'.");
        return Ok(());
    }

    for package in packages {
        println!(
            "  {}  {:<28} {:<8} {:<36} {}",
            style(short_id(&package.id)).dim(),
            package.name,
            package.source,
            package.version,
            package.meta.version
        );
    }
    Ok(())
}

fn run_remove(runner: &CliRunner, query: &str, yes: bool) -> Result<(), CliError> {
    let mut store = runner.store()?;
    let package = find_package(&store, query)?;

    confirm(
        &format!(
            "Remove pack '{}' and delete {}?",
            package.name,
            package.game.display()
        ),
        yes,
    )?;
    store.remove_package(&package.id)?;
    println!("Removed pack '{}'", package.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirdmc::profile::{PackageMeta, PackageSource};

    fn package(url: Option<&str>, forge: Option<&str>) -> PackageProfile {
        let meta = PackageMeta {
            name: "Pack".to_string(),
            url: url.map(str::to_string),
            ..Default::default()
        };
        let profile = PackageProfile::new(
            "Pack",
            "1.12.2-forge1.12.2-14.23.5.2847",
            "1.12.2",
            "/games/Pack",
            meta,
            PackageSource::Curse,
        );
        match forge {
            Some(build) => profile.with_forge(build),
            None => profile,
        }
    }

    #[test]
    fn test_reinstall_uses_source_address() {
        let request = reinstall_request(&package(
            Some("https://minecraft.curseforge.com/projects/pack"),
            Some("14.23.5.2847"),
        ))
        .unwrap();
        assert_eq!(
            request,
            PackageRequest::from_url("https://minecraft.curseforge.com/projects/pack")
        );
    }

    #[test]
    fn test_reinstall_custom_pack() {
        let request = reinstall_request(&package(None, Some("14.23.5.2847"))).unwrap();
        assert_eq!(
            request,
            PackageRequest::custom("Pack", "1.12.2", "14.23.5.2847")
        );
        assert!(reinstall_request(&package(None, None)).is_err());
    }
}
