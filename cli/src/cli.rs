use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fio_control_catalog::{Catalog, RunOverrides, RunSelection};
use fio_control_runner::prelude::DEFAULT_IOENGINE;

#[derive(Parser)]
#[command(name = "fio-control", version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Launch fio and follow the run until it finishes
    Run(RunArgs),
    /// List the presets in the catalog
    Presets(CatalogArgs),
    /// Show the parameters and fio arguments a selection resolves to, without running fio
    Resolve(ResolveArgs),
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Path to a YAML catalog of presets. The built-in catalog is used if not set.
    #[arg(long, env = "FIO_CONTROL_CATALOG")]
    pub catalog: Option<PathBuf>,
}

impl CatalogArgs {
    pub fn load(&self) -> anyhow::Result<Catalog> {
        match &self.catalog {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display())),
            None => Catalog::embedded().context("Built-in catalog is invalid"),
        }
    }
}

#[derive(Args)]
pub struct SelectionArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Test scenario, which sets the runtime, ramp time and size
    #[arg(long)]
    pub scenario: Option<String>,

    /// Workload preset, which sets the I/O pattern and suggests block size, queue depth and jobs
    #[arg(long)]
    pub workload: Option<String>,

    /// Storage type, which overrides the workload's queue depth and job count
    #[arg(long)]
    pub storage_type: Option<String>,

    /// Block size, for example `4k`
    #[arg(long)]
    pub bs: Option<String>,

    /// Queue depth
    #[arg(long)]
    pub iodepth: Option<u32>,

    /// Number of fio jobs
    #[arg(long)]
    pub numjobs: Option<u32>,

    /// Size of the test file, for example `1G`
    #[arg(long)]
    pub size: Option<String>,

    /// Bypass the page cache. Enabled unless set to false.
    #[arg(long)]
    pub direct: Option<bool>,
}

impl SelectionArgs {
    pub fn selection(&self) -> RunSelection {
        RunSelection {
            scenario: self.scenario.clone(),
            workload: self.workload.clone(),
            storage_type: self.storage_type.clone(),
            overrides: RunOverrides {
                block_size: self.bs.clone(),
                queue_depth: self.iodepth,
                job_count: self.numjobs,
                size: self.size.clone(),
                direct: self.direct,
            },
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    /// Path to the fio binary. Falls back to `FIO_CONTROL_FIO_PATH`, then `fio` on the `PATH`.
    #[arg(long)]
    pub fio_path: Option<PathBuf>,

    /// How often to check on the run, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Cancel the run if it has not finished after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Print every status as a line of JSON instead of showing progress and tables
    #[arg(long, default_value = "false")]
    pub json: bool,
}

#[derive(Args)]
pub struct EngineArgs {
    /// Directory for the test file, the log and the results
    #[arg(long, env = "FIO_CONTROL_WORK_DIR", default_value = "./test-data")]
    pub work_dir: PathBuf,

    /// fio I/O engine
    #[arg(long, default_value = DEFAULT_IOENGINE)]
    pub ioengine: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let args = CliArgs::try_parse_from(["fio-control", "run"]).unwrap();
        let Command::Run(run) = args.command else {
            panic!("Expected the run command");
        };

        assert_eq!(1000, run.poll_interval_ms);
        assert_eq!("libaio", run.engine.ioengine);
        assert!(!run.no_progress);
        assert!(!run.json);
        assert_eq!(None, run.selection.direct);
    }

    #[test]
    fn selection_flags_become_overrides() {
        let args = CliArgs::try_parse_from([
            "fio-control",
            "resolve",
            "--workload",
            "olap",
            "--bs",
            "128k",
            "--iodepth",
            "8",
            "--direct",
            "false",
        ])
        .unwrap();
        let Command::Resolve(resolve) = args.command else {
            panic!("Expected the resolve command");
        };

        let selection = resolve.selection.selection();
        assert_eq!(Some("olap"), selection.workload.as_deref());
        assert_eq!(Some("128k"), selection.overrides.block_size.as_deref());
        assert_eq!(Some(8), selection.overrides.queue_depth);
        assert_eq!(Some(false), selection.overrides.direct);
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(CliArgs::try_parse_from(["fio-control", "run", "--poll-interval-ms", "0"]).is_err());
    }
}
