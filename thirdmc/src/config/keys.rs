//! Addressable configuration keys (`section.key`).

use std::path::PathBuf;
use std::str::FromStr;

use super::file::{parse_value, ConfigError, ConfigFile};

/// A single setting in `config.ini`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DataDir,
    TimeoutSecs,
    MaxRedirects,
    UserAgent,
    Java,
    JvmArgs,
    MemoryGb,
    PlayerName,
    Visibility,
    Unpack200,
}

impl ConfigKey {
    /// Every key, in the order `config list` prints them.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::DataDir,
            ConfigKey::TimeoutSecs,
            ConfigKey::MaxRedirects,
            ConfigKey::UserAgent,
            ConfigKey::Java,
            ConfigKey::JvmArgs,
            ConfigKey::MemoryGb,
            ConfigKey::PlayerName,
            ConfigKey::Visibility,
            ConfigKey::Unpack200,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::DataDir => "paths",
            ConfigKey::TimeoutSecs | ConfigKey::MaxRedirects | ConfigKey::UserAgent => "download",
            ConfigKey::Java
            | ConfigKey::JvmArgs
            | ConfigKey::MemoryGb
            | ConfigKey::PlayerName
            | ConfigKey::Visibility => "launch",
            ConfigKey::Unpack200 => "tools",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::DataDir => "data_dir",
            ConfigKey::TimeoutSecs => "timeout_secs",
            ConfigKey::MaxRedirects => "max_redirects",
            ConfigKey::UserAgent => "user_agent",
            ConfigKey::Java => "java",
            ConfigKey::JvmArgs => "jvm_args",
            ConfigKey::MemoryGb => "memory_gb",
            ConfigKey::PlayerName => "player_name",
            ConfigKey::Visibility => "visibility",
            ConfigKey::Unpack200 => "unpack200",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let path = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        match self {
            ConfigKey::DataDir => path(&config.paths.data_dir),
            ConfigKey::TimeoutSecs => config.download.timeout_secs.to_string(),
            ConfigKey::MaxRedirects => config.download.max_redirects.to_string(),
            ConfigKey::UserAgent => config.download.user_agent.clone(),
            ConfigKey::Java => config.launch.java.display().to_string(),
            ConfigKey::JvmArgs => config.launch.jvm_args.clone(),
            ConfigKey::MemoryGb => config.launch.memory_gb.to_string(),
            ConfigKey::PlayerName => config.launch.player_name.clone(),
            ConfigKey::Visibility => config.launch.visibility.to_string(),
            ConfigKey::Unpack200 => path(&config.tools.unpack200),
        }
    }

    /// Validate and store a value. An empty value clears optional paths.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let optional_path = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| PathBuf::from(v))
        };
        let name = self.name();
        match self {
            ConfigKey::DataDir => config.paths.data_dir = optional_path(value),
            ConfigKey::TimeoutSecs => {
                let secs: u64 = parse_value(&name, value)?;
                if secs == 0 {
                    return Err(invalid(&name, value, "must be at least 1"));
                }
                config.download.timeout_secs = secs;
            }
            ConfigKey::MaxRedirects => config.download.max_redirects = parse_value(&name, value)?,
            ConfigKey::UserAgent => config.download.user_agent = value.trim().to_string(),
            ConfigKey::Java => {
                let java = optional_path(value)
                    .ok_or_else(|| invalid(&name, value, "must not be empty"))?;
                config.launch.java = java;
            }
            ConfigKey::JvmArgs => config.launch.jvm_args = value.trim().to_string(),
            ConfigKey::MemoryGb => {
                let gb: u32 = parse_value(&name, value)?;
                if gb == 0 {
                    return Err(invalid(&name, value, "must be at least 1"));
                }
                config.launch.memory_gb = gb;
            }
            ConfigKey::PlayerName => {
                let player = value.trim();
                if player.is_empty() {
                    return Err(invalid(&name, value, "must not be empty"));
                }
                config.launch.player_name = player.to_string();
            }
            ConfigKey::Visibility => {
                config.launch.visibility = value
                    .parse()
                    .map_err(|reason: String| invalid(&name, value, &reason))?;
            }
            ConfigKey::Unpack200 => config.tools.unpack200 = optional_path(value),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
