//! thirdmc - installer core for a third-party game launcher.
//!
//! The crate fetches, verifies and assembles a runnable game install:
//! version metadata, libraries, assets, natives, a patched loader version
//! and imported content packs. Work is expressed as jobs on a
//! [`scheduler::Scheduler`], which runs them one at a time and lets a job
//! put prerequisite jobs ahead of itself.
//!
//! # Example
//!
//! ```no_run
//! use thirdmc::manager::{DataLayout, HttpDownloader, InstallerConfig};
//! use thirdmc::profile::JsonProfileStore;
//! use thirdmc::scheduler::{JobSpec, Scheduler};
//!
//! let config = InstallerConfig::new(thirdmc::config::default_data_dir());
//! let layout = DataLayout::new(config.data_dir.clone());
//! layout.prepare()?;
//!
//! let downloader = HttpDownloader::from_config(&config)?;
//! let mut store = JsonProfileStore::load(layout.settings_file())?;
//! let mut scheduler = Scheduler::new(config, &downloader, &mut store);
//! scheduler.enqueue(JobSpec::version("1.12.2"));
//! scheduler.run()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod launch;
pub mod loader;
pub mod logging;
pub mod manager;
pub mod platform;
pub mod profile;
pub mod scheduler;
pub mod sources;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
