//! `versions list` and `versions install`.

use clap::Subcommand;
use console::style;
use thirdmc::scheduler::JobSpec;
use thirdmc::version::VersionManifest;

use super::common::print_summary;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Versions subcommands.
#[derive(Debug, Subcommand)]
pub enum VersionsCommands {
    /// List installable versions
    List {
        /// Include snapshots
        #[arg(long)]
        snapshots: bool,
    },

    /// Install a version, optionally as a named instance
    Install {
        /// Version id (e.g., 1.12.2)
        id: String,

        /// Create an instance with this name
        #[arg(long)]
        name: Option<String>,
    },
}

/// Run a versions subcommand.
pub fn run(runner: &CliRunner, command: VersionsCommands) -> Result<(), CliError> {
    match command {
        VersionsCommands::List { snapshots } => run_list(runner, snapshots),
        VersionsCommands::Install { id, name } => run_install(runner, id, name),
    }
}

fn run_list(runner: &CliRunner, snapshots: bool) -> Result<(), CliError> {
    let downloader = runner.downloader()?;
    let manifest =
        VersionManifest::fetch(&downloader, &runner.installer().endpoints.version_manifest)?;

    println!(
        "Latest release: {}   Latest snapshot: {}",
        style(&manifest.latest.release).green(),
        manifest.latest.snapshot
    );
    println!();

    for entry in manifest.installable(snapshots) {
        let installed = runner.layout().version_dir(&entry.id).is_dir();
        println!(
            "  {:<24} {:<9} {}{}",
            entry.id,
            entry.kind,
            entry.release_time.as_deref().unwrap_or(""),
            if installed {
                style("  (installed)").cyan().to_string()
            } else {
                String::new()
            }
        );
    }
    Ok(())
}

fn run_install(runner: &CliRunner, id: String, name: Option<String>) -> Result<(), CliError> {
    let summary = runner.run_jobs(vec![JobSpec::Version {
        id,
        url: None,
        profile: name,
    }])?;
    print_summary(&summary);
    Ok(())
}
