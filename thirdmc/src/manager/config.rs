//! Runtime configuration for the install pipeline.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{default_data_dir, ConfigFile};
use crate::launch::Session;

use super::download::{DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT_SECS};

/// Default `User-Agent` header for outgoing requests.
pub const DEFAULT_USER_AGENT: &str = concat!("thirdmc/", env!("CARGO_PKG_VERSION"));

/// Remote endpoints the pipelines talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Listing of every published version.
    pub version_manifest: String,
    /// Base URL of content-addressed asset objects.
    pub resources: String,
    /// Base URL of vanilla libraries, used when a loader library names none.
    pub libraries: String,
    /// Maven repository holding loader universal jars.
    pub loader_maven: String,
    /// Lookup endpoint that redirects a numeric project id to its slug.
    pub curse_project_lookup: String,
    /// Base URL of project pages on the first content source.
    pub curse_projects: String,
    /// Launcher API of the second content source.
    pub technic_api: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            version_manifest: "https://launchermeta.mojang.com/mc/game/version_manifest.json"
                .to_string(),
            resources: "http://resources.download.minecraft.net".to_string(),
            libraries: "https://libraries.minecraft.net/".to_string(),
            loader_maven: "https://files.minecraftforge.net/maven/net/minecraftforge/forge"
                .to_string(),
            curse_project_lookup: "https://mods.curse.com/project".to_string(),
            curse_projects: "https://minecraft.curseforge.com/projects".to_string(),
            technic_api: "http://api.technicpack.net".to_string(),
        }
    }
}

/// Configuration for the installer.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Root of the on-disk layout (`versions/`, `libraries/`, ...).
    pub data_dir: PathBuf,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Maximum redirect hops before a fetch fails.
    pub max_redirects: usize,

    /// `User-Agent` sent with every request.
    pub user_agent: String,

    /// Explicit path to `unpack200`; looked up on `PATH` when unset.
    pub unpack200: Option<PathBuf>,

    /// Java executable used for launching.
    pub java: PathBuf,

    /// Extra JVM arguments, whitespace separated.
    pub jvm_args: Vec<String>,

    /// Maximum heap in gigabytes.
    pub memory_gb: u32,

    /// Player identity substituted into launch arguments.
    pub session: Session,

    /// Remote endpoints.
    pub endpoints: Endpoints,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            unpack200: None,
            java: PathBuf::from("java"),
            jvm_args: Vec::new(),
            memory_gb: 2,
            session: Session::default(),
            endpoints: Endpoints::default(),
        }
    }
}

impl InstallerConfig {
    /// Create a new configuration rooted at the given data directory.
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Build the runtime configuration from `config.ini` settings.
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut config = Self::new(
            file.paths
                .data_dir
                .clone()
                .unwrap_or_else(default_data_dir),
        )
        .with_timeout(Duration::from_secs(file.download.timeout_secs))
        .with_max_redirects(file.download.max_redirects)
        .with_user_agent(file.download.user_agent.clone())
        .with_java(file.launch.java.clone())
        .with_memory_gb(file.launch.memory_gb);

        config.jvm_args = file
            .launch
            .jvm_args
            .split_whitespace()
            .map(str::to_string)
            .collect();
        config.session.player_name = file.launch.player_name.clone();
        config.unpack200 = file.tools.unpack200.clone();
        config
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the redirect bound.
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the `unpack200` location.
    pub fn with_unpack200(mut self, path: PathBuf) -> Self {
        self.unpack200 = Some(path);
        self
    }

    /// Set the java executable.
    pub fn with_java(mut self, java: PathBuf) -> Self {
        self.java = java;
        self
    }

    /// Set the maximum heap; values below 1 are raised to 1.
    pub fn with_memory_gb(mut self, gb: u32) -> Self {
        self.memory_gb = gb.max(1);
        self
    }

    /// Set the launch session.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Replace the remote endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InstallerConfig::default();
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.unpack200.is_none());
        assert!(config.user_agent.starts_with("thirdmc/"));
    }

    #[test]
    fn test_builder_pattern() {
        let config = InstallerConfig::new(PathBuf::from("/games/data"))
            .with_timeout(Duration::from_secs(60))
            .with_max_redirects(2)
            .with_memory_gb(0)
            .with_unpack200(PathBuf::from("/opt/java/bin/unpack200"));

        assert_eq!(config.data_dir, PathBuf::from("/games/data"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_redirects, 2);
        assert_eq!(config.memory_gb, 1);
        assert_eq!(
            config.unpack200,
            Some(PathBuf::from("/opt/java/bin/unpack200"))
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = ConfigFile::default();
        file.paths.data_dir = Some(PathBuf::from("/srv/mc"));
        file.download.max_redirects = 4;
        file.launch.jvm_args = "-XX:+UseG1GC  -Dfoo=bar".to_string();
        file.launch.player_name = "Steve".to_string();

        let config = InstallerConfig::from_file(&file);
        assert_eq!(config.data_dir, PathBuf::from("/srv/mc"));
        assert_eq!(config.max_redirects, 4);
        assert_eq!(config.jvm_args, vec!["-XX:+UseG1GC", "-Dfoo=bar"]);
        assert_eq!(config.session.player_name, "Steve");
    }
}
