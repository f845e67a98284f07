use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::Arc;

use crate::ingest::ingest;
use crate::log_tail::{tail_lines, TAIL_LINES, TAIL_WINDOW_BYTES};
use crate::registry::{Observation, RunRecord, RunRegistry};
use crate::status::{progress_percent, remaining_seconds, RunStatus};
use crate::types::RunHandle;

/// Shown in place of the log while it cannot be read yet.
pub const LOG_PLACEHOLDER: &str = "Collecting logs...";

/// Answers "how is this run doing?" for an observer that asks on a fixed cadence.
///
/// Each poll is cheap and never blocks on fio. A run is reported as finished exactly once, after
/// which it is forgotten and further polls return [RunStatus::Unknown].
#[derive(Debug, Clone)]
pub struct Poller {
    registry: Arc<RunRegistry>,
}

impl Poller {
    pub fn new(registry: Arc<RunRegistry>) -> Self {
        Self { registry }
    }

    pub fn poll(&self, handle: &RunHandle) -> RunStatus {
        match self.registry.observe(&handle.run_id) {
            Observation::Unknown => {
                log::trace!("Run {} is not registered", handle.run_id);
                RunStatus::Unknown
            }
            Observation::Alive {
                elapsed,
                expected_duration_secs,
                log_file,
            } => {
                let status = RunStatus::Running {
                    progress_percent: progress_percent(elapsed, expected_duration_secs),
                    recent_log: recent_log(&log_file),
                    remaining_seconds: remaining_seconds(elapsed, expected_duration_secs),
                };
                log::trace!("Run {} tick: {status:?}", handle.run_id);
                status
            }
            Observation::Finished { record, exit } => finish(record, exit),
        }
    }
}

fn recent_log(log_file: &Path) -> String {
    match tail_lines(log_file, TAIL_LINES, TAIL_WINDOW_BYTES) {
        Ok(lines) if !lines.is_empty() => lines.join("\n"),
        Ok(_) => LOG_PLACEHOLDER.to_string(),
        Err(e) => {
            log::trace!("Log {} not readable yet: {e}", log_file.display());
            LOG_PLACEHOLDER.to_string()
        }
    }
}

/// Turn the end of a run into its one terminal status. Runs after the record has left the
/// registry, so reading results never holds up other callers.
fn finish(record: RunRecord, exit: io::Result<ExitStatus>) -> RunStatus {
    let run_id = record.run_id();

    let exit = match exit {
        Ok(exit) => exit,
        Err(e) => {
            log::warn!("Run {run_id} failed: could not check the fio process: {e}");
            return RunStatus::Failed {
                error: format!("Could not check the fio process: {e}"),
            };
        }
    };

    match ingest(record.output_file()) {
        Ok(result) => {
            if !exit.success() {
                log::warn!("Run {run_id} produced results but fio exited with {exit}");
            }
            log::info!("Run {run_id} completed");
            RunStatus::Completed { result }
        }
        Err(e) => {
            let error = if exit.success() {
                e.to_string()
            } else {
                format!("fio exited with {exit}: {e}")
            };
            log::warn!("Run {run_id} failed: {error}");
            RunStatus::Failed { error }
        }
    }
}
