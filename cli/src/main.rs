use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser as _;
use fio_control_catalog::resolve;
use fio_control_core::prelude::StopHandle;
use fio_control_runner::prelude::*;

use crate::cli::{CatalogArgs, CliArgs, Command, ResolveArgs, RunArgs};

mod cli;
mod table;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    match args.command {
        Command::Run(args) => run(args).await,
        Command::Presets(args) => presets(args),
        Command::Resolve(args) => dry_run(args),
    }
}

async fn run(args: RunArgs) -> anyhow::Result<()> {
    let catalog = args.selection.catalog.load()?;
    let params = resolve(&catalog, &args.selection.selection()).context("Invalid run parameters")?;

    let fio = fio_path(args.fio_path.as_deref())?;
    match fio_version(&fio) {
        Ok(version) => log::info!("Using {version} at {}", fio.display()),
        Err(e) => log::warn!("Could not determine fio version: {e:?}"),
    }

    let registry = Arc::new(RunRegistry::new());
    let launcher = Launcher::new(
        registry.clone(),
        LaunchConfig::default()
            .with_fio_path(fio)
            .with_ioengine(args.engine.ioengine),
    );
    let poller = Poller::new(registry.clone());

    let handle = launcher
        .launch(&params, &args.engine.work_dir)
        .context("Failed to launch fio")?;

    if args.json {
        println!("{}", serde_json::to_string(&handle)?);
    } else {
        println!(
            "Started run {} (log: {})",
            handle.run_id,
            handle.log_file.display()
        );
    }

    let stop = StopHandle::new();
    let listener = stop.new_listener();
    stop_on_interrupt(stop.clone());
    if let Some(timeout) = args.timeout {
        stop_after(stop.clone(), Duration::from_secs(timeout));
    }

    let progress = (!args.no_progress && !args.json)
        .then(|| RunProgress::new(params.ramp_secs() + params.duration_secs()));
    let json = args.json;

    let outcome = observe(
        &poller,
        &handle,
        Duration::from_millis(args.poll_interval_ms),
        listener,
        |status| {
            if json {
                match serde_json::to_string(status) {
                    Ok(line) => println!("{line}"),
                    Err(e) => log::error!("Failed to serialise status: {e}"),
                }
            } else if let Some(progress) = &progress {
                progress.update(status);
            }
        },
    )
    .await;

    match outcome {
        Ok(RunStatus::Completed { result }) => {
            if !json {
                println!("\nRun {} completed", handle.run_id);
                println!("{}", table::render(table::summary_rows(&result.summary())));
            }
            Ok(())
        }
        Ok(RunStatus::Failed { error }) => bail!("Run {} failed: {error}", handle.run_id),
        Ok(RunStatus::Unknown) => bail!("Run {} not found", handle.run_id),
        Ok(status) => bail!("Run {} stopped in state {status:?}", handle.run_id),
        Err(stopped) => {
            if let Some(progress) = &progress {
                progress.clear();
            }
            registry
                .cancel(&handle.run_id)
                .context("Failed to cancel run")?;
            bail!("Run {} cancelled: {stopped}", handle.run_id)
        }
    }
}

fn presets(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = args.load()?;

    let sections = [
        ("Scenarios", catalog.scenario_options()),
        ("Workloads", catalog.workload_options()),
        ("Storage types", catalog.storage_type_options()),
        ("Block sizes", catalog.block_size_options()),
        ("Queue depths", catalog.queue_depth_options()),
        ("Job counts", catalog.job_count_options()),
    ];
    for (title, options) in sections {
        println!("\n{title}");
        println!("{}", table::render(table::option_rows(options)));
    }

    Ok(())
}

fn dry_run(args: ResolveArgs) -> anyhow::Result<()> {
    let catalog = args.selection.catalog.load()?;
    let params = resolve(&catalog, &args.selection.selection()).context("Invalid run parameters")?;

    let run_id = RunId::generate();
    let artifacts = RunArtifacts::new(&args.engine.work_dir, &run_id);
    let argv = fio_args(&params, &artifacts, &run_id, &args.engine.ioengine);

    println!("{}", table::render(table::parameter_rows(&params)));
    println!(
        "\nExpected duration: {}s",
        params.ramp_secs() + params.duration_secs()
    );
    println!("\n{}", command_line(std::path::Path::new("fio"), &argv));

    Ok(())
}
