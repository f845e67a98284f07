mod fio_binary;
mod ingest;
mod interrupt;
mod invocation;
mod launcher;
mod log_tail;
mod observe;
mod poller;
mod progress;
mod registry;
mod status;
mod types;

pub mod prelude {
    pub use crate::fio_binary::{fio_path, fio_version, FIO_PATH_ENV};
    pub use crate::ingest::{ingest, IngestionError};
    pub use crate::interrupt::{stop_after, stop_on_interrupt};
    pub use crate::invocation::{command_line, fio_args, RunArtifacts};
    pub use crate::launcher::{LaunchConfig, LaunchError, Launcher, DEFAULT_IOENGINE};
    pub use crate::log_tail::{tail_lines, TAIL_LINES, TAIL_WINDOW_BYTES};
    pub use crate::observe::observe;
    pub use crate::poller::{Poller, LOG_PLACEHOLDER};
    pub use crate::progress::RunProgress;
    pub use crate::registry::{CancelError, RunRecord, RunRegistry};
    pub use crate::status::{progress_percent, remaining_seconds, RunStatus};
    pub use crate::types::{FioControlResult, RunHandle, RunId};
}
