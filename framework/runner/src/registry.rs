use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use fio_control_catalog::RunParameters;
use parking_lot::Mutex;

use crate::types::RunId;

/// Everything known about a launched run while its fio process may still be running.
///
/// Owned by the [RunRegistry] from the moment fio is spawned until the run is observed to have
/// finished or is cancelled.
#[derive(Debug)]
pub struct RunRecord {
    run_id: RunId,
    child: Child,
    output_file: PathBuf,
    log_file: PathBuf,
    params: RunParameters,
    started_at: Instant,
    started_at_wall: DateTime<Local>,
    expected_duration_secs: u64,
}

impl RunRecord {
    pub(crate) fn new(
        run_id: RunId,
        child: Child,
        output_file: PathBuf,
        log_file: PathBuf,
        params: RunParameters,
    ) -> Self {
        // fio ramps up before the timed part of the run starts.
        let expected_duration_secs = params.ramp_secs() + params.duration_secs();

        Self {
            run_id,
            child,
            output_file,
            log_file,
            params,
            started_at: Instant::now(),
            started_at_wall: Local::now(),
            expected_duration_secs,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at_wall
    }

    pub fn expected_duration_secs(&self) -> u64 {
        self.expected_duration_secs
    }

    /// Kill the fio process if it is still running and reap it.
    pub(crate) fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill()?;
            self.child.wait()?;
        }
        Ok(())
    }
}

/// What a single look at a registered run found.
#[derive(Debug)]
pub(crate) enum Observation {
    /// Nothing is registered under the identifier.
    Unknown,
    /// fio is still running.
    Alive {
        elapsed: Duration,
        expected_duration_secs: u64,
        log_file: PathBuf,
    },
    /// fio has exited, or its state could not be determined, and the record has been removed.
    Finished {
        record: RunRecord,
        exit: io::Result<ExitStatus>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CancelError {
    #[error("Failed to stop fio for run {run_id}: {source}")]
    Kill {
        run_id: RunId,
        #[source]
        source: io::Error,
    },
}

/// The runs that have been launched and not yet observed to finish.
///
/// Shared between the launcher, which inserts, and the poller, which removes. A single lock
/// guards the map and is never held while reading logs or results.
#[derive(Debug, Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<RunId, RunRecord>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run. Gives the record back if the identifier is already taken.
    pub(crate) fn insert(&self, record: RunRecord) -> Result<(), RunRecord> {
        let mut runs = self.runs.lock();
        if runs.contains_key(&record.run_id) {
            return Err(record);
        }
        runs.insert(record.run_id.clone(), record);
        Ok(())
    }

    pub fn contains(&self, run_id: &RunId) -> bool {
        self.runs.lock().contains_key(run_id)
    }

    pub fn len(&self) -> usize {
        self.runs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.lock().is_empty()
    }

    pub fn run_ids(&self) -> Vec<RunId> {
        let mut ids = self.runs.lock().keys().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Check on a run, removing it in the same step if its process is no longer running.
    pub(crate) fn observe(&self, run_id: &RunId) -> Observation {
        let mut runs = self.runs.lock();
        let Some(record) = runs.get_mut(run_id) else {
            return Observation::Unknown;
        };

        let exit = match record.child.try_wait() {
            Ok(None) => {
                return Observation::Alive {
                    elapsed: record.started_at.elapsed(),
                    expected_duration_secs: record.expected_duration_secs,
                    log_file: record.log_file.clone(),
                };
            }
            Ok(Some(status)) => Ok(status),
            Err(e) => Err(e),
        };

        let Some(mut record) = runs.remove(run_id) else {
            return Observation::Unknown;
        };
        drop(runs);

        if exit.is_err() {
            // The state is unknown, make sure the process does not outlive its record.
            if let Err(e) = record.terminate() {
                log::warn!("Failed to stop fio for run {run_id}: {e}");
            }
        }

        Observation::Finished { record, exit }
    }

    /// Stop a run and forget it. Returns `false` if no run is registered under the identifier.
    pub fn cancel(&self, run_id: &RunId) -> Result<bool, CancelError> {
        let Some(mut record) = self.runs.lock().remove(run_id) else {
            return Ok(false);
        };

        log::info!("Cancelling run {run_id} (PID {})", record.pid());
        record.terminate().map_err(|source| CancelError::Kill {
            run_id: run_id.clone(),
            source,
        })?;

        Ok(true)
    }
}

impl Drop for RunRegistry {
    fn drop(&mut self) {
        for (run_id, mut record) in self.runs.get_mut().drain() {
            log::warn!("Stopping fio for run {run_id}, which was still registered on shutdown");
            if let Err(e) = record.terminate() {
                log::error!("Failed to stop fio for run {run_id}: {e}");
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::{Command, Stdio};

    use fio_control_catalog::Pattern;

    use super::*;

    fn params() -> RunParameters {
        RunParameters::builder()
            .pattern(Pattern::RandomRead)
            .block_size("4k")
            .queue_depth(1)
            .job_count(1)
            .size("1M")
            .duration_secs(30)
            .ramp_secs(2)
            .build()
            .unwrap()
    }

    fn record(run_id: &str, script: &str) -> RunRecord {
        let child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        RunRecord::new(
            RunId::from(run_id),
            child,
            PathBuf::from("/nonexistent/results.json"),
            PathBuf::from("/nonexistent/log.txt"),
            params(),
        )
    }

    #[test]
    fn expected_duration_includes_ramp() {
        let registry = RunRegistry::new();
        let record = record("a", "exit 0");
        assert_eq!(32, record.expected_duration_secs());
        registry.insert(record).unwrap();
    }

    #[test]
    fn rejects_duplicate_identifier() {
        let registry = RunRegistry::new();
        registry.insert(record("a", "sleep 30")).unwrap();

        let mut duplicate = registry.insert(record("a", "sleep 30")).unwrap_err();
        duplicate.terminate().unwrap();

        assert_eq!(1, registry.len());
        assert!(registry.cancel(&RunId::from("a")).unwrap());
    }

    #[test]
    fn observe_removes_finished_run() {
        let registry = RunRegistry::new();
        registry.insert(record("a", "exit 3")).unwrap();

        let observation = loop {
            match registry.observe(&RunId::from("a")) {
                Observation::Alive { .. } => std::thread::sleep(Duration::from_millis(20)),
                other => break other,
            }
        };

        match observation {
            Observation::Finished { exit, .. } => assert_eq!(Some(3), exit.unwrap().code()),
            other => panic!("Unexpected observation: {other:?}"),
        }
        assert!(registry.is_empty());
        assert!(matches!(
            registry.observe(&RunId::from("a")),
            Observation::Unknown
        ));
    }

    #[test]
    fn cancel_kills_and_forgets() {
        let registry = RunRegistry::new();
        registry.insert(record("a", "sleep 30")).unwrap();
        registry.insert(record("b", "sleep 30")).unwrap();
        assert_eq!(vec![RunId::from("a"), RunId::from("b")], registry.run_ids());

        assert!(registry.cancel(&RunId::from("a")).unwrap());
        assert!(!registry.contains(&RunId::from("a")));
        assert!(registry.contains(&RunId::from("b")));
        assert!(!registry.cancel(&RunId::from("a")).unwrap());
    }

    #[test]
    fn drop_stops_remaining_runs() {
        let registry = RunRegistry::new();
        registry.insert(record("a", "sleep 30")).unwrap();
        let pid = registry.runs.lock().get(&RunId::from("a")).unwrap().pid();

        drop(registry);

        // The process has been killed and reaped, so signalling it fails.
        let status = Command::new("kill")
            .arg("-0")
            .arg(pid.to_string())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(!status.success());
    }
}
