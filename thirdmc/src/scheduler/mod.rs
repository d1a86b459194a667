//! Install job scheduling.
//!
//! The [`Scheduler`] owns an ordered [`JobQueue`] and runs one job at a
//! time. Each job kind has a pipeline: a sequence of fallible steps over a
//! [`Context`] that ends in an [`Outcome`]. A pipeline either finishes,
//! possibly queueing follow-up jobs at the tail, or asks for prerequisite
//! jobs which are run ahead of it before it resumes.
//!
//! Any error is terminal for the whole run: the queue is cleared, the
//! scratch directory removed and the error reported to the sink.

mod job;
mod pipelines;
mod progress;
mod queue;

use tracing::{debug, info, warn};

pub use job::{Continuation, Job, JobKind, JobSpec, Outcome, PackageRequest};
pub use progress::{LogSink, ProgressSink};
pub use queue::JobQueue;

use crate::launch::Launcher;
use crate::manager::config::InstallerConfig;
use crate::manager::download::Checksum;
use crate::manager::error::{InstallError, InstallResult};
use crate::manager::layout::DataLayout;
use crate::manager::legacy_pack::{PackUnpacker, Unpack200};
use crate::manager::traits::{Downloader, FetchOutcome, ProgressCallback};
use crate::platform::Platform;
use crate::profile::ProfileStore;

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Kinds of the jobs that finished, in order.
    pub completed: Vec<JobKind>,
    /// Package files left out across all jobs.
    pub skipped: usize,
}

/// Borrowed state a pipeline runs against.
pub(crate) struct Context<'r, 'a> {
    pub(crate) layout: &'r DataLayout,
    pub(crate) config: &'r InstallerConfig,
    pub(crate) downloader: &'a dyn Downloader,
    pub(crate) store: &'r mut (dyn ProfileStore + 'a),
    pub(crate) sink: &'r mut (dyn ProgressSink + 'a),
    pub(crate) launcher: Option<&'r mut (dyn Launcher + 'a)>,
    pub(crate) unpacker: &'r (dyn PackUnpacker + 'a),
    pub(crate) platform: Platform,
    pub(crate) kind: JobKind,
    pub(crate) skipped: usize,
}

impl Context<'_, '_> {
    pub(crate) fn progress(&mut self, message: &str, percent: f64) {
        self.sink.progress(self.kind, message, percent);
    }

    /// Download with transfer progress forwarded to the sink.
    pub(crate) fn fetch(
        &mut self,
        url: &str,
        dest: &std::path::Path,
        expected: Option<&Checksum>,
    ) -> InstallResult<FetchOutcome> {
        let kind = self.kind;
        let file = dest
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        let sink = &mut *self.sink;
        let mut report = |written: u64, total: u64| sink.transfer(kind, &file, written, total);
        let callback: ProgressCallback<'_> = &mut report;
        self.downloader.download(url, dest, expected, Some(callback))
    }
}

/// Runs queued install jobs one at a time.
pub struct Scheduler<'a> {
    layout: DataLayout,
    config: InstallerConfig,
    downloader: &'a dyn Downloader,
    store: &'a mut dyn ProfileStore,
    sink: Box<dyn ProgressSink + 'a>,
    launcher: Option<Box<dyn Launcher + 'a>>,
    unpacker: Box<dyn PackUnpacker + 'a>,
    platform: Platform,
    queue: JobQueue,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        config: InstallerConfig,
        downloader: &'a dyn Downloader,
        store: &'a mut dyn ProfileStore,
    ) -> Self {
        let unpacker = Unpack200::new(config.unpack200.clone());
        Self {
            layout: DataLayout::new(config.data_dir.clone()),
            config,
            downloader,
            store,
            sink: Box::new(LogSink),
            launcher: None,
            unpacker: Box::new(unpacker),
            platform: Platform::current(),
            queue: JobQueue::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl ProgressSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_launcher(mut self, launcher: impl Launcher + 'a) -> Self {
        self.launcher = Some(Box::new(launcher));
        self
    }

    pub fn with_unpacker(mut self, unpacker: impl PackUnpacker + 'a) -> Self {
        self.unpacker = Box::new(unpacker);
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn enqueue(&mut self, spec: JobSpec) {
        debug!(job = %spec, "Queued");
        self.queue.push(spec);
    }

    /// Drop all queued jobs and scratch data.
    pub fn abort(&mut self) {
        let dropped = self.queue.clear();
        if let Err(e) = self.layout.clear_scratch() {
            warn!(error = %e, "Failed to remove scratch directory");
        }
        debug!(dropped, "Queue cleared");
    }

    /// Run until the queue is empty or a job fails.
    pub fn run(&mut self) -> InstallResult<RunSummary> {
        let mut summary = RunSummary::default();

        loop {
            let Some((spec, resumed)) = self
                .queue
                .activate_head()
                .map(|job| (job.spec.clone(), job.continuation.take()))
            else {
                break;
            };
            let kind = spec.kind();
            info!(job = %spec, resumed = resumed.is_some(), "Running job");

            let (result, skipped) = self.run_pipeline(&spec, resumed.as_ref());
            summary.skipped += skipped;

            let outcome = result.and_then(|outcome| match outcome {
                Outcome::Requires { prerequisites, .. } if resumed.is_some() => {
                    Err(InstallError::UnresolvedDependency {
                        job: spec.to_string(),
                        missing: describe(&prerequisites),
                    })
                }
                other => Ok(other),
            });

            match outcome {
                Ok(Outcome::Done { follow_ups }) => {
                    self.queue.complete_head(follow_ups);
                    self.sink.finished(kind, &format!("Finished {}", spec));
                    summary.completed.push(kind);
                }
                Ok(Outcome::Requires {
                    prerequisites,
                    continuation,
                }) => {
                    info!(job = %spec, requires = %describe(&prerequisites), "Deferring job");
                    self.queue.defer_head(prerequisites, continuation);
                }
                Err(e) => {
                    self.abort();
                    self.sink.failed(kind, &e);
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    fn run_pipeline(
        &mut self,
        spec: &JobSpec,
        resumed: Option<&Continuation>,
    ) -> (InstallResult<Outcome>, usize) {
        let mut ctx = Context {
            layout: &self.layout,
            config: &self.config,
            downloader: self.downloader,
            store: &mut *self.store,
            sink: self.sink.as_mut(),
            launcher: self.launcher.as_deref_mut(),
            unpacker: self.unpacker.as_ref(),
            platform: self.platform,
            kind: spec.kind(),
            skipped: 0,
        };
        let result = pipelines::run(&mut ctx, spec, resumed);
        (result, ctx.skipped)
    }
}

fn describe(specs: &[JobSpec]) -> String {
    specs
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
