//! CLI error type.

use thiserror::Error;

use thirdmc::config::ConfigError;
use thirdmc::logging::LoggingError;
use thirdmc::manager::InstallError;
use thirdmc::profile::StoreError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An install, import or launch job failed.
    #[error(transparent)]
    Install(#[from] InstallError),

    /// Profiles could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Logging could not be set up.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// No instance or package with the given id.
    #[error(
        "No instance or package with id '{0}'. Use 'thirdmc instances list' or 'thirdmc packs list'."
    )]
    UnknownProfile(String),

    /// An id prefix that fits more than one profile.
    #[error("'{query}' matches {count} profiles; give more of the id")]
    AmbiguousId { query: String, count: usize },

    /// The user declined a confirmation.
    #[error("Cancelled")]
    Cancelled,

    /// Terminal interaction failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
