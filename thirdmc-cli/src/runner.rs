//! Shared startup for commands: configuration, data layout and logging.

use tracing::info;

use thirdmc::config::{ConfigFile, LauncherVisibility};
use thirdmc::logging::{init_logging, WorkerGuard};
use thirdmc::manager::{DataLayout, HttpDownloader, InstallerConfig};
use thirdmc::profile::JsonProfileStore;
use thirdmc::scheduler::{JobSpec, RunSummary, Scheduler};

use crate::error::CliError;
use crate::launcher::ProcessLauncher;
use crate::output::ConsoleSink;

/// Everything a command needs to talk to the data directory.
pub struct CliRunner {
    config_file: ConfigFile,
    installer: InstallerConfig,
    layout: DataLayout,
    _log_guard: WorkerGuard,
}

impl CliRunner {
    /// Load `config.ini`, prepare the data directory and start logging.
    ///
    /// Stale scratch data from an interrupted run is removed here.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config_file = ConfigFile::load()?;
        let installer = InstallerConfig::from_file(&config_file);
        let layout = DataLayout::new(installer.data_dir.clone());
        layout.prepare()?;
        let log_guard = init_logging(&layout.logs(), verbose)?;

        Ok(Self {
            config_file,
            installer,
            layout,
            _log_guard: log_guard,
        })
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command,
            data_dir = %self.layout.root().display(),
            "thirdmc starting"
        );
    }

    pub fn installer(&self) -> &InstallerConfig {
        &self.installer
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn visibility(&self) -> LauncherVisibility {
        self.config_file.launch.visibility
    }

    pub fn downloader(&self) -> Result<HttpDownloader, CliError> {
        Ok(HttpDownloader::from_config(&self.installer)?)
    }

    pub fn store(&self) -> Result<JsonProfileStore, CliError> {
        Ok(JsonProfileStore::load(self.layout.settings_file())?)
    }

    /// Run `jobs` to completion with console progress.
    pub fn run_jobs(&self, jobs: Vec<JobSpec>) -> Result<RunSummary, CliError> {
        let downloader = self.downloader()?;
        let mut store = self.store()?;

        let mut scheduler = Scheduler::new(self.installer.clone(), &downloader, &mut store)
            .with_sink(ConsoleSink::new())
            .with_launcher(ProcessLauncher::new(self.visibility()));
        for job in jobs {
            scheduler.enqueue(job);
        }
        Ok(scheduler.run()?)
    }
}
