//! `config.ini` loading and saving.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use super::config_file_path;
use crate::manager::config::DEFAULT_USER_AGENT;
use crate::manager::download::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS};

/// Errors from reading, writing or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read { path: PathBuf, source: ini::Error },

    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// What the launcher does with itself while the game runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LauncherVisibility {
    /// Wait for the game and report when it exits.
    #[default]
    Wait,
    /// Hand the game off and return immediately.
    Detach,
}

impl LauncherVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wait => "wait",
            Self::Detach => "detach",
        }
    }
}

impl fmt::Display for LauncherVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LauncherVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wait" => Ok(Self::Wait),
            "detach" => Ok(Self::Detach),
            other => Err(format!("expected 'wait' or 'detach', got '{}'", other)),
        }
    }
}

/// `[paths]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathsSettings {
    pub data_dir: Option<PathBuf>,
}

/// `[download]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `[launch]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub java: PathBuf,
    pub jvm_args: String,
    pub memory_gb: u32,
    pub player_name: String,
    pub visibility: LauncherVisibility,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jvm_args: String::new(),
            memory_gb: 2,
            player_name: "Player".to_string(),
            visibility: LauncherVisibility::default(),
        }
    }
}

/// `[tools]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolsSettings {
    pub unpack200: Option<PathBuf>,
}

/// Parsed contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub paths: PathsSettings,
    pub download: DownloadSettings,
    pub launch: LaunchSettings,
    pub tools: ToolsSettings,
}

impl ConfigFile {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|e| ConfigError::Write {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let get = |section: &str, key: &str| -> Option<String> {
            ini.section(Some(section))
                .and_then(|s| s.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        config.paths.data_dir = get("paths", "data_dir").map(PathBuf::from);

        if let Some(v) = get("download", "timeout_secs") {
            config.download.timeout_secs = parse_value("download.timeout_secs", &v)?;
        }
        if let Some(v) = get("download", "max_redirects") {
            config.download.max_redirects = parse_value("download.max_redirects", &v)?;
        }
        if let Some(v) = get("download", "user_agent") {
            config.download.user_agent = v;
        }

        if let Some(v) = get("launch", "java") {
            config.launch.java = PathBuf::from(v);
        }
        if let Some(v) = get("launch", "jvm_args") {
            config.launch.jvm_args = v;
        }
        if let Some(v) = get("launch", "memory_gb") {
            config.launch.memory_gb = parse_value("launch.memory_gb", &v)?;
        }
        if let Some(v) = get("launch", "player_name") {
            config.launch.player_name = v;
        }
        if let Some(v) = get("launch", "visibility") {
            config.launch.visibility = v.parse().map_err(|reason| ConfigError::InvalidValue {
                key: "launch.visibility".to_string(),
                value: v.clone(),
                reason,
            })?;
        }

        config.tools.unpack200 = get("tools", "unpack200").map(PathBuf::from);
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        if let Some(dir) = &self.paths.data_dir {
            ini.with_section(Some("paths"))
                .set("data_dir", dir.to_string_lossy().to_string());
        }

        ini.with_section(Some("download"))
            .set("timeout_secs", self.download.timeout_secs.to_string())
            .set("max_redirects", self.download.max_redirects.to_string())
            .set("user_agent", self.download.user_agent.clone());

        ini.with_section(Some("launch"))
            .set("java", self.launch.java.to_string_lossy().to_string())
            .set("jvm_args", self.launch.jvm_args.clone())
            .set("memory_gb", self.launch.memory_gb.to_string())
            .set("player_name", self.launch.player_name.clone())
            .set("visibility", self.launch.visibility.as_str());

        if let Some(tool) = &self.tools.unpack200 {
            ini.with_section(Some("tools"))
                .set("unpack200", tool.to_string_lossy().to_string());
        }
        ini
    }
}

pub(crate) fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.paths.data_dir = Some(PathBuf::from("/srv/games"));
        config.download.max_redirects = 3;
        config.launch.visibility = LauncherVisibility::Detach;
        config.tools.unpack200 = Some(PathBuf::from("/usr/lib/jvm/bin/unpack200"));
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[download]\nmax_redirects = lots\n").unwrap();

        match ConfigFile::load_from(&path) {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, "download.max_redirects")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[launch]\njava =\nmemory_gb = 6\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.launch.java, PathBuf::from("java"));
        assert_eq!(config.launch.memory_gb, 6);
    }
}
