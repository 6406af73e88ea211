//! CLI output formatting

use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::job::RunStatus;
use crate::execution::JobEvent;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the jobs of a run.
///
/// The length grows while the run executes: fan-out stages attach
/// children that were unknown when the bar was created.
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Apply an engine event to the progress bar.
pub fn update_progress(progress: &ProgressBar, event: &JobEvent) {
    match event {
        JobEvent::RunStarted { total_jobs, .. } => {
            progress.set_length(*total_jobs as u64);
        }
        JobEvent::JobStarted { name, .. } => {
            progress.set_message(name.clone());
        }
        JobEvent::FanOut { children, .. } => {
            progress.inc_length(*children as u64);
        }
        JobEvent::JobSucceeded { .. } => {
            progress.inc(1);
        }
        JobEvent::JobFailed { id, error } => {
            progress.inc(1);
            progress.println(format!("{} {} failed: {}", CROSS, style(id).bold(), error));
        }
        JobEvent::RunCompleted { .. } => {
            progress.finish_and_clear();
        }
    }
}

/// Format an execution event for display
pub fn format_job_event(event: &JobEvent) -> String {
    match event {
        JobEvent::RunStarted {
            run_id, total_jobs, ..
        } => format!(
            "{} Run {} started with {} jobs",
            ROCKET,
            style(&run_id.to_string()[..8]).dim(),
            style(total_jobs).cyan()
        ),
        JobEvent::JobStarted { name, .. } => {
            format!("{} {}", INFO, style(name).bold())
        }
        JobEvent::FanOut { id, children } => format!(
            "{} {} fanned out into {} jobs",
            INFO,
            style(id).bold(),
            style(children).cyan()
        ),
        JobEvent::JobSucceeded { id } => {
            format!("{} {}", CHECK, style(id).green())
        }
        JobEvent::JobFailed { id, error } => {
            format!("{} {} - {}", CROSS, style(id).red(), error)
        }
        JobEvent::RunCompleted { run_id, status } => format!(
            "{} Run {} {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}
