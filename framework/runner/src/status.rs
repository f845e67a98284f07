use std::time::Duration;

use fio_control_summary_model::ParsedResult;
use serde::Serialize;

/// What a poll found out about a run.
///
/// Serialised with a `status` tag so that observers can dispatch on it, for example
/// `{"status":"running","progress_percent":42.0,...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Running {
        /// Elapsed share of the expected duration, from 0 to 100.
        progress_percent: f64,
        /// The end of the run's log, newline separated.
        recent_log: String,
        remaining_seconds: u64,
    },
    Completed {
        result: ParsedResult,
    },
    Failed {
        error: String,
    },
    /// No run is registered under the handle, either because it never existed or because its
    /// outcome has already been reported.
    #[serde(rename = "none")]
    Unknown,
}

impl RunStatus {
    /// Whether the run has finished. After a terminal status every poll returns
    /// [RunStatus::Unknown].
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Failed { .. })
    }
}

/// Elapsed time as a percentage of the expected duration, capped at 100.
///
/// A run with no expected duration is reported as complete straight away.
pub fn progress_percent(elapsed: Duration, expected_secs: u64) -> f64 {
    if expected_secs == 0 {
        return 100.0;
    }

    (elapsed.as_secs_f64() / expected_secs as f64 * 100.0).min(100.0)
}

/// Whole seconds left until the expected duration is reached.
pub fn remaining_seconds(elapsed: Duration, expected_secs: u64) -> u64 {
    expected_secs.saturating_sub(elapsed.as_secs())
}
