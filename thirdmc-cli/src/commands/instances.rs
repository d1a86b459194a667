//! `instances list` and `instances remove`.

use clap::Subcommand;
use console::style;
use thirdmc::profile::ProfileStore;

use super::common::{confirm, find_by_id, short_id};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Instances subcommands.
#[derive(Debug, Subcommand)]
pub enum InstancesCommands {
    /// List instances
    List,

    /// Remove an instance and its game directory
    Remove {
        /// Instance id (a unique prefix is enough)
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run an instances subcommand.
pub fn run(runner: &CliRunner, command: InstancesCommands) -> Result<(), CliError> {
    match command {
        InstancesCommands::List => run_list(runner),
        InstancesCommands::Remove { id, yes } => run_remove(runner, &id, yes),
    }
}

fn run_list(runner: &CliRunner) -> Result<(), CliError> {
    let store = runner.store()?;
    let instances = store.list_instances();

    if instances.is_empty() {
        println!("No instances. Create one with 'thirdmc versions install <id> --name <name>'.");
        return Ok(());
    }

    for instance in instances {
        println!(
            "  {}  {:<24} {:<16} {}",
            style(short_id(&instance.id)).dim(),
            instance.name,
            instance.version,
            instance.added.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn run_remove(runner: &CliRunner, query: &str, yes: bool) -> Result<(), CliError> {
    let mut store = runner.store()?;
    let instance = find_by_id(store.list_instances(), |p| p.id.as_str(), query)?
        .cloned()
        .ok_or_else(|| CliError::UnknownProfile(query.to_string()))?;

    confirm(
        &format!(
            "Remove instance '{}' and delete {}?",
            instance.name,
            instance.game.display()
        ),
        yes,
    )?;
    store.remove_instance(&instance.id)?;
    println!("Removed instance '{}'", instance.name);
    Ok(())
}
