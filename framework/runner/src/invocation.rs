use std::path::{Path, PathBuf};

use fio_control_catalog::RunParameters;

use crate::types::RunId;

/// Files written for a single run, all named after its [RunId].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// fio's JSON results.
    pub output_file: PathBuf,
    /// fio's combined stdout and stderr, preceded by the command line.
    pub log_file: PathBuf,
    /// The file fio reads and writes during the benchmark.
    pub target_file: PathBuf,
}

impl RunArtifacts {
    pub fn new(work_dir: &Path, run_id: &RunId) -> Self {
        Self {
            output_file: work_dir.join(format!("results_{run_id}.json")),
            log_file: work_dir.join(format!("log_{run_id}.txt")),
            target_file: work_dir.join(format!("testfile_{run_id}")),
        }
    }
}

/// Build fio's argument list.
///
/// Runs are always time based with grouped reporting and JSON output written to
/// [RunArtifacts::output_file]. `--rwmixread` is only added for a mixed pattern with less than
/// 100% reads.
pub fn fio_args(
    params: &RunParameters,
    artifacts: &RunArtifacts,
    run_id: &RunId,
    ioengine: &str,
) -> Vec<String> {
    let mut args = vec![
        format!("--filename={}", artifacts.target_file.display()),
        format!("--direct={}", u8::from(params.direct())),
        format!("--rw={}", params.pattern().fio_token()),
        format!("--bs={}", params.block_size()),
        format!("--numjobs={}", params.job_count()),
        format!("--iodepth={}", params.queue_depth()),
        format!("--size={}", params.size()),
        format!("--runtime={}", params.duration_secs()),
        format!("--ramp_time={}", params.ramp_secs()),
        "--time_based".to_string(),
        format!("--ioengine={ioengine}"),
        "--group_reporting".to_string(),
        "--output-format=json".to_string(),
        format!("--output={}", artifacts.output_file.display()),
        format!("--name=test_{run_id}"),
    ];

    if let Some(pct) = params.mixed_read_flag() {
        args.push(format!("--rwmixread={pct}"));
    }

    args
}

/// Render a command for logging. Not intended to be fed back to a shell.
pub fn command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use fio_control_catalog::Pattern;
    use pretty_assertions::assert_eq;

    use super::*;

    fn params(pattern: Pattern, mix: u32) -> RunParameters {
        RunParameters::builder()
            .pattern(pattern)
            .block_size("4k")
            .queue_depth(32)
            .job_count(4)
            .size("1G")
            .duration_secs(60)
            .ramp_secs(10)
            .mixed_read_pct(mix)
            .build()
            .unwrap()
    }

    #[test]
    fn builds_full_argument_list() {
        let run_id = RunId::from("20261018_120000-abcdef");
        let artifacts = RunArtifacts::new(Path::new("/data"), &run_id);

        let args = fio_args(&params(Pattern::RandomRead, 100), &artifacts, &run_id, "libaio");

        assert_eq!(
            vec![
                "--filename=/data/testfile_20261018_120000-abcdef",
                "--direct=1",
                "--rw=randread",
                "--bs=4k",
                "--numjobs=4",
                "--iodepth=32",
                "--size=1G",
                "--runtime=60",
                "--ramp_time=10",
                "--time_based",
                "--ioengine=libaio",
                "--group_reporting",
                "--output-format=json",
                "--output=/data/results_20261018_120000-abcdef.json",
                "--name=test_20261018_120000-abcdef",
            ],
            args
        );
    }

    #[test]
    fn appends_mix_for_mixed_pattern() {
        let run_id = RunId::from("id");
        let artifacts = RunArtifacts::new(Path::new("/data"), &run_id);

        let mixed = fio_args(&params(Pattern::RandomMixed, 70), &artifacts, &run_id, "libaio");
        assert_eq!(Some(&"--rwmixread=70".to_string()), mixed.last());

        let full_read = fio_args(&params(Pattern::RandomMixed, 100), &artifacts, &run_id, "libaio");
        assert!(!full_read.iter().any(|arg| arg.starts_with("--rwmixread")));

        let not_mixed = fio_args(&params(Pattern::SequentialWrite, 70), &artifacts, &run_id, "libaio");
        assert!(!not_mixed.iter().any(|arg| arg.starts_with("--rwmixread")));
    }

    #[test]
    fn renders_command_line() {
        let line = command_line(
            Path::new("fio"),
            &["--rw=read".to_string(), "--bs=4k".to_string()],
        );
        assert_eq!("fio --rw=read --bs=4k", line);
    }
}
