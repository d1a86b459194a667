//! thirdmc CLI - Command-line interface
//!
//! Installs game versions, loaders and modpacks into the data directory
//! and launches them.

mod commands;
mod error;
mod launcher;
mod output;
mod runner;

use clap::{Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;
use commands::instances::InstancesCommands;
use commands::packs::PacksCommands;
use commands::versions::VersionsCommands;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "thirdmc", version, about = "Game version, loader and modpack installer")]
struct Cli {
    /// Log debug output to the console as well as the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List and install game versions
    #[command(subcommand)]
    Versions(VersionsCommands),

    /// Manage installed instances
    #[command(subcommand)]
    Instances(InstancesCommands),

    /// Launch an instance or package by id
    Launch {
        /// Instance or package id (a unique prefix is enough)
        id: String,
    },

    /// Import, create and manage modpacks
    #[command(subcommand)]
    Packs(PacksCommands),

    /// View and change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn run(cli: Cli) -> Result<(), CliError> {
    let command = match cli.command {
        Commands::Config(command) => return commands::config::run(command),
        other => other,
    };

    let runner = CliRunner::new(cli.verbose)?;
    match command {
        Commands::Versions(command) => {
            runner.log_startup("versions");
            commands::versions::run(&runner, command)
        }
        Commands::Instances(command) => {
            runner.log_startup("instances");
            commands::instances::run(&runner, command)
        }
        Commands::Launch { id } => {
            runner.log_startup("launch");
            commands::launch::run(&runner, &id)
        }
        Commands::Packs(command) => {
            runner.log_startup("packs");
            commands::packs::run(&runner, command)
        }
        Commands::Config(command) => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_pack_create() {
        let cli = Cli::parse_from([
            "thirdmc", "packs", "create", "--name", "My Pack", "--mc", "1.12.2", "--forge",
            "14.23.5.2847",
        ]);
        match cli.command {
            Commands::Packs(PacksCommands::Create { name, mc, forge }) => {
                assert_eq!(name, "My Pack");
                assert_eq!(mc, "1.12.2");
                assert_eq!(forge, "14.23.5.2847");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_versions_list_snapshots() {
        let cli = Cli::parse_from(["thirdmc", "-v", "versions", "list", "--snapshots"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Versions(VersionsCommands::List { snapshots: true })
        ));
    }
}
