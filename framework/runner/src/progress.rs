use std::fmt::Write;

use indicatif::{ProgressBar, ProgressState, ProgressStyle};

use crate::status::RunStatus;

/// Progress bar for a single run, driven by the statuses an observer receives.
#[derive(Debug)]
pub struct RunProgress {
    pb: ProgressBar,
}

impl RunProgress {
    pub fn new(expected_duration_secs: u64) -> Self {
        let pb = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos:>3}% [{elapsed_precise} / {planned_runtime}] {msg}",
        )
        .map(|style| {
            style
                .with_key("planned_runtime", {
                    let hours = expected_duration_secs / 3600;
                    let minutes = (expected_duration_secs % 3600) / 60;
                    let seconds = expected_duration_secs % 60;
                    move |_state: &ProgressState, w: &mut dyn Write| {
                        let _ = write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds);
                    }
                })
                .progress_chars("#>-")
        });
        match style {
            Ok(style) => pb.set_style(style),
            Err(e) => log::warn!("Failed to set progress style: {e}"),
        }

        Self { pb }
    }

    /// Show a status. Only running statuses move the bar, terminal ones finish it.
    pub fn update(&self, status: &RunStatus) {
        match status {
            RunStatus::Running {
                progress_percent,
                recent_log,
                ..
            } => {
                self.pb.set_position(progress_percent.floor() as u64);
                self.pb.set_message(last_line(recent_log).to_string());
            }
            RunStatus::Completed { .. } => {
                self.pb.set_position(100);
                self.pb.finish_and_clear();
            }
            RunStatus::Failed { .. } | RunStatus::Unknown => self.pb.abandon(),
        }
    }

    pub fn clear(&self) {
        self.pb.finish_and_clear();
    }
}

fn last_line(log: &str) -> &str {
    log.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_skips_blank_lines() {
        assert_eq!("jobs: 1", last_line("Command: fio\n\njobs: 1\n\n"));
        assert_eq!("", last_line(""));
    }

    #[test]
    fn tracks_running_progress() {
        let progress = RunProgress::new(70);
        progress.update(&RunStatus::Running {
            progress_percent: 42.7,
            recent_log: "Command: fio\n\nJobs: 4".to_string(),
            remaining_seconds: 40,
        });

        assert_eq!(42, progress.pb.position());
        assert_eq!("Jobs: 4", progress.pb.message());
        progress.clear();
        assert!(progress.pb.is_finished());
    }
}
