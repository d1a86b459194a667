//! Progress reporting from running jobs.

use tracing::{debug, error, info, trace, warn};

use super::job::JobKind;
use crate::manager::error::InstallError;

/// Receives progress of the running job.
///
/// All calls happen on the scheduler's thread, in between blocking steps.
pub trait ProgressSink {
    /// A step started; `percent` is the job's overall progress (0-100).
    fn progress(&mut self, kind: JobKind, message: &str, percent: f64);

    /// Bytes written for the file currently downloading.
    fn transfer(&mut self, _kind: JobKind, _file: &str, _written: u64, _total: u64) {}

    /// `count` package files could not be fetched and were left out.
    fn skipped(&mut self, _kind: JobKind, _count: usize) {}

    /// The job failed and the queue was cleared.
    fn failed(&mut self, kind: JobKind, error: &InstallError);

    fn finished(&mut self, kind: JobKind, message: &str);
}

/// Sink that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn progress(&mut self, kind: JobKind, message: &str, percent: f64) {
        debug!(job = %kind, percent = format!("{:.1}", percent), "{}", message);
    }

    fn transfer(&mut self, kind: JobKind, file: &str, written: u64, total: u64) {
        trace!(job = %kind, file, written, total, "Transfer");
    }

    fn skipped(&mut self, kind: JobKind, count: usize) {
        warn!(job = %kind, count, "Files skipped because they could not be fetched");
    }

    fn failed(&mut self, kind: JobKind, error: &InstallError) {
        error!(job = %kind, error = %error, "Job failed");
    }

    fn finished(&mut self, kind: JobKind, message: &str) {
        info!(job = %kind, "{}", message);
    }
}

/// Percentage of `done` out of `total`, 100 for an empty set.
pub(crate) fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        done as f64 * 100.0 / total as f64
    }
}
