//! Console rendering of job progress.

use std::time::Duration;

use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};

use thirdmc::manager::InstallError;
use thirdmc::scheduler::{JobKind, ProgressSink};

const BAR_TEMPLATE: &str =
    "{spinner:.green} {prefix:>10.cyan.bold} [{bar:30.cyan/blue}] {pos:>3}% {wide_msg}";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

/// One progress bar per running job.
#[derive(Default)]
pub struct ConsoleSink {
    bar: Option<(JobKind, ProgressBar)>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn bar_for(&mut self, kind: JobKind) -> &ProgressBar {
        if self.bar.as_ref().is_some_and(|(current, _)| *current != kind) {
            self.clear();
        }
        let (_, bar) = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new(100).with_style(bar_style());
            bar.set_prefix(kind.name());
            bar.enable_steady_tick(Duration::from_millis(120));
            (kind, bar)
        });
        bar
    }

    fn clear(&mut self) {
        if let Some((_, bar)) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn progress(&mut self, kind: JobKind, message: &str, percent: f64) {
        let bar = self.bar_for(kind);
        bar.set_position(percent.clamp(0.0, 100.0) as u64);
        bar.set_message(message.to_string());
    }

    fn transfer(&mut self, kind: JobKind, file: &str, written: u64, total: u64) {
        let bar = self.bar_for(kind);
        bar.set_message(format!(
            "{} {}/{}",
            file,
            HumanBytes(written),
            HumanBytes(total)
        ));
    }

    fn skipped(&mut self, kind: JobKind, count: usize) {
        let bar = self.bar_for(kind);
        bar.println(format!(
            "{} {} file(s) could not be downloaded and were skipped",
            style("warning:").yellow().bold(),
            count
        ));
    }

    fn failed(&mut self, kind: JobKind, error: &InstallError) {
        self.clear();
        eprintln!(
            "{} {} failed: {}",
            style("✗").red().bold(),
            kind,
            error
        );
    }

    fn finished(&mut self, _kind: JobKind, message: &str) {
        self.clear();
        println!("{} {}", style("✓").green().bold(), message);
    }
}
