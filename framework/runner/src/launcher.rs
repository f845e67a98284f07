use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use fio_control_catalog::RunParameters;

use crate::invocation::{command_line, fio_args, RunArtifacts};
use crate::registry::{RunRecord, RunRegistry};
use crate::types::{RunHandle, RunId};

pub const DEFAULT_IOENGINE: &str = "libaio";

/// How fio is invoked, independent of the parameters of any one run.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    fio_path: PathBuf,
    ioengine: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            fio_path: PathBuf::from("fio"),
            ioengine: DEFAULT_IOENGINE.to_string(),
        }
    }
}

impl LaunchConfig {
    pub fn with_fio_path(mut self, fio_path: impl Into<PathBuf>) -> Self {
        self.fio_path = fio_path.into();
        self
    }

    pub fn with_ioengine(mut self, ioengine: impl Into<String>) -> Self {
        self.ioengine = ioengine.into();
        self
    }

    pub fn fio_path(&self) -> &Path {
        &self.fio_path
    }

    pub fn ioengine(&self) -> &str {
        &self.ioengine
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to create working directory {}: {source}", path.display())]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("A run with id {0} is already registered")]
    DuplicateRunId(RunId),
}

/// Starts fio runs in the background and registers them for polling.
#[derive(Debug, Clone)]
pub struct Launcher {
    registry: Arc<RunRegistry>,
    config: LaunchConfig,
}

impl Launcher {
    pub fn new(registry: Arc<RunRegistry>, config: LaunchConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Start fio for `params`, writing its artifacts under `work_dir`.
    ///
    /// Returns as soon as the process has been spawned. The run is registered before this returns,
    /// so the first poll with the returned handle will find it.
    pub fn launch(&self, params: &RunParameters, work_dir: &Path) -> Result<RunHandle, LaunchError> {
        fs::create_dir_all(work_dir).map_err(|source| LaunchError::WorkDir {
            path: work_dir.to_path_buf(),
            source,
        })?;

        let run_id = RunId::generate();
        let artifacts = RunArtifacts::new(work_dir, &run_id);
        let args = fio_args(params, &artifacts, &run_id, &self.config.ioengine);
        let cmd_line = command_line(&self.config.fio_path, &args);

        let (stdout, stderr) = open_log(&artifacts.log_file, &cmd_line).map_err(|source| {
            remove_log(&artifacts.log_file);
            LaunchError::LogFile {
                path: artifacts.log_file.clone(),
                source,
            }
        })?;

        log::info!("Starting run {run_id}: {cmd_line}");
        let child = Command::new(&self.config.fio_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|source| {
                remove_log(&artifacts.log_file);
                LaunchError::Spawn {
                    program: self.config.fio_path.clone(),
                    source,
                }
            })?;
        log::debug!("Run {run_id} started with PID {}", child.id());

        let record = RunRecord::new(
            run_id.clone(),
            child,
            artifacts.output_file,
            artifacts.log_file.clone(),
            params.clone(),
        );
        if let Err(mut rejected) = self.registry.insert(record) {
            // The log file belongs to the run already registered under this id.
            log::error!("Run id {run_id} collided with a registered run");
            if let Err(e) = rejected.terminate() {
                log::warn!("Failed to stop fio for rejected run {run_id}: {e}");
            }
            return Err(LaunchError::DuplicateRunId(run_id));
        }

        Ok(RunHandle {
            run_id,
            log_file: artifacts.log_file,
        })
    }
}

/// Create the log file with a header naming the command, and return handles for fio's stdout and
/// stderr that append to it.
fn open_log(path: &Path, cmd_line: &str) -> io::Result<(File, File)> {
    let mut file = File::create(path)?;
    writeln!(file, "Command: {cmd_line}")?;
    writeln!(file)?;
    file.flush()?;

    let stderr = file.try_clone()?;
    Ok((file, stderr))
}

fn remove_log(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("Failed to remove log file {}: {e}", path.display());
        }
    }
}
