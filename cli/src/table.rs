use fio_control_catalog::{PresetOption, RunParameters};
use fio_control_summary_model::{DirectionSummary, ResultSummary};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
pub struct DirectionRow {
    #[tabled(rename = "Direction")]
    pub direction: &'static str,
    #[tabled(rename = "IOPS", display = "float2")]
    pub iops: f64,
    #[tabled(rename = "Bandwidth (MiB/s)", display = "float2")]
    pub bandwidth_mib_s: f64,
    #[tabled(rename = "Mean latency (us)", display = "float2")]
    pub mean_latency_us: f64,
    #[tabled(rename = "p95 (us)", display = "float2")]
    pub p95_latency_us: f64,
    #[tabled(rename = "p99 (us)", display = "float2")]
    pub p99_latency_us: f64,
}

impl DirectionRow {
    fn new(direction: &'static str, summary: &DirectionSummary) -> Self {
        Self {
            direction,
            iops: summary.iops,
            bandwidth_mib_s: summary.bandwidth_mib_s,
            mean_latency_us: summary.mean_latency_us,
            p95_latency_us: summary.p95_latency_us,
            p99_latency_us: summary.p99_latency_us,
        }
    }
}

#[derive(Tabled)]
pub struct OptionRow {
    #[tabled(rename = "Name")]
    pub label: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct ParameterRow {
    #[tabled(rename = "Parameter")]
    pub parameter: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}

/// Rows for the directions that saw any I/O. Both are shown if neither did.
pub fn summary_rows(summary: &ResultSummary) -> Vec<DirectionRow> {
    let active = |d: &DirectionSummary| d.iops > 0.0 || d.bandwidth_mib_s > 0.0;

    let mut rows = Vec::new();
    if active(&summary.read) {
        rows.push(DirectionRow::new("read", &summary.read));
    }
    if active(&summary.write) {
        rows.push(DirectionRow::new("write", &summary.write));
    }
    if rows.is_empty() {
        rows.push(DirectionRow::new("read", &summary.read));
        rows.push(DirectionRow::new("write", &summary.write));
    }
    rows
}

pub fn parameter_rows(params: &RunParameters) -> Vec<ParameterRow> {
    let mut rows = vec![
        ParameterRow {
            parameter: "Pattern",
            value: params.pattern().to_string(),
        },
        ParameterRow {
            parameter: "Block size",
            value: params.block_size().to_string(),
        },
        ParameterRow {
            parameter: "Queue depth",
            value: params.queue_depth().to_string(),
        },
        ParameterRow {
            parameter: "Jobs",
            value: params.job_count().to_string(),
        },
        ParameterRow {
            parameter: "Size",
            value: params.size().to_string(),
        },
        ParameterRow {
            parameter: "Direct I/O",
            value: params.direct().to_string(),
        },
        ParameterRow {
            parameter: "Runtime (s)",
            value: params.duration_secs().to_string(),
        },
        ParameterRow {
            parameter: "Ramp time (s)",
            value: params.ramp_secs().to_string(),
        },
    ];
    if params.pattern().is_mixed() {
        rows.push(ParameterRow {
            parameter: "Reads (%)",
            value: params.mixed_read_pct().to_string(),
        });
    }
    rows
}

pub fn option_rows(options: Vec<PresetOption>) -> Vec<OptionRow> {
    options
        .into_iter()
        .map(|option| OptionRow {
            label: option.label,
            value: option.value,
        })
        .collect()
}

pub fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}
