//! Persistent user configuration.
//!
//! Settings live in `config.ini` inside the data directory. The file is
//! optional; every key has a default. Keys are addressed as
//! `section.key` (for example `download.max_redirects`) by the CLI.

mod file;
mod keys;

use std::path::PathBuf;

pub use file::{
    ConfigError, ConfigFile, DownloadSettings, LaunchSettings, LauncherVisibility, PathsSettings,
    ToolsSettings,
};
pub use keys::ConfigKey;

/// Name of the data directory created under the user's home.
pub const DATA_DIR_NAME: &str = ".3rdmc";

/// Default data directory, `~/.3rdmc`.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    default_data_dir().join("config.ini")
}
