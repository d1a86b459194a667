//! `config get|set|list|path` - read and edit `config.ini`.

use clap::Subcommand;
use console::style;
use thirdmc::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting as section.key (e.g., launch.memory_gb)
        key: String,
    },

    /// Change one setting and save config.ini
    Set {
        /// Setting as section.key (e.g., launch.visibility)
        key: String,

        /// New value; an empty string clears optional paths
        value: String,
    },

    /// Print every setting grouped by section
    List,

    /// Print where config.ini lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key: ConfigKey = key.parse()?;
            println!("{}", display_value(&key.get(&ConfigFile::load()?)));
        }
        ConfigCommands::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            let mut config = ConfigFile::load()?;
            key.set(&mut config, &value)?;
            config.save()?;
            println!(
                "{} {} = {}",
                style("✓").green(),
                key.name(),
                display_value(&key.get(&config))
            );
        }
        ConfigCommands::List => print_sections(&ConfigFile::load()?),
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn display_value(value: &str) -> String {
    if value.is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}

fn print_sections(config: &ConfigFile) {
    let mut section = None;
    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            if section.is_some() {
                println!();
            }
            println!("{}", style(format!("[{}]", key.section())).bold());
            section = Some(key.section());
        }
        let value = key.get(config);
        if value.is_empty() {
            println!("  {:<14} {}", key.key_name(), style("(not set)").dim());
        } else {
            println!("  {:<14} {}", key.key_name(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_marks_unset() {
        assert_eq!(display_value(""), "(not set)");
        assert_eq!(display_value("detach"), "detach");
    }
}
