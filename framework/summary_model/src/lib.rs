use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// Statistics for a latency distribution as reported by fio, in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub stddev: f64,
    /// Completion latency percentiles, keyed the way fio writes them, for example `99.000000`.
    ///
    /// Only present for `clat_ns`, unless fio was asked for percentiles on other latencies.
    #[serde(default)]
    pub percentile: BTreeMap<String, f64>,
}

impl LatencyStats {
    /// Look up a percentile, such as `95.0`, in nanoseconds.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentile
            .iter()
            .find(|(key, _)| key.parse::<f64>().is_ok_and(|k| (k - p).abs() < 1e-6))
            .map(|(_, value)| *value)
    }
}

/// One direction (read or write) of a fio job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoStats {
    #[serde(default)]
    pub io_bytes: u64,
    /// Bandwidth in KiB/s.
    #[serde(default)]
    pub bw: f64,
    #[serde(default)]
    pub iops: f64,
    /// Milliseconds spent doing I/O in this direction.
    #[serde(default)]
    pub runtime: u64,
    #[serde(default)]
    pub total_ios: u64,
    #[serde(default)]
    pub lat_ns: LatencyStats,
    #[serde(default)]
    pub clat_ns: LatencyStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub jobname: String,
    /// Non-zero if fio hit an error in this job.
    #[serde(default)]
    pub error: i64,
    #[serde(default)]
    pub read: IoStats,
    #[serde(default)]
    pub write: IoStats,
}

/// The parts of fio's `--output-format=json` document that fio-control relies on.
///
/// Everything else in the document is ignored here but kept in [ParsedResult::document].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FioOutput {
    #[serde(rename = "fio version", default)]
    pub fio_version: Option<String>,
    /// Unix timestamp in seconds of when the results were written.
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub jobs: Vec<JobResult>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("Results are not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("Results do not match the expected fio layout: {0}")]
    Layout(#[source] serde_json::Error),
    #[error("Results contain no jobs")]
    NoJobs,
}

/// A validated fio results document.
///
/// The document itself is owned by fio, so it is kept verbatim and handed on as is. The typed
/// [FioOutput] view is checked when the result is created so that consumers do not discover a
/// malformed document later.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResult {
    document: serde_json::Value,
    output: FioOutput,
}

impl ParsedResult {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResultError> {
        let document: serde_json::Value = serde_json::from_slice(bytes).map_err(ResultError::Json)?;
        Self::from_document(document)
    }

    pub fn from_document(document: serde_json::Value) -> Result<Self, ResultError> {
        let output = FioOutput::deserialize(&document).map_err(ResultError::Layout)?;
        if output.jobs.is_empty() {
            return Err(ResultError::NoJobs);
        }

        Ok(Self { document, output })
    }

    /// The document exactly as fio wrote it.
    pub fn document(&self) -> &serde_json::Value {
        &self.document
    }

    pub fn output(&self) -> &FioOutput {
        &self.output
    }

    pub fn jobs(&self) -> &[JobResult] {
        &self.output.jobs
    }

    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_jobs(self.jobs())
    }
}

impl Serialize for ParsedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Headline numbers for a run.
///
/// Throughput is summed over all jobs and latency means are averaged over jobs. Percentiles come
/// from the first job, which holds the aggregate when fio runs with `--group_reporting`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    pub read: DirectionSummary,
    pub write: DirectionSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectionSummary {
    pub iops: f64,
    pub bandwidth_mib_s: f64,
    pub mean_latency_us: f64,
    pub p95_latency_us: f64,
    pub p99_latency_us: f64,
}

impl ResultSummary {
    pub fn from_jobs(jobs: &[JobResult]) -> Self {
        Self {
            read: DirectionSummary::from_jobs(jobs, |job| &job.read),
            write: DirectionSummary::from_jobs(jobs, |job| &job.write),
        }
    }
}

impl DirectionSummary {
    fn from_jobs(jobs: &[JobResult], stats: impl Fn(&JobResult) -> &IoStats) -> Self {
        if jobs.is_empty() {
            return Self::default();
        }

        let first = stats(&jobs[0]);
        let percentile_us = |p| first.clat_ns.percentile(p).unwrap_or(0.0) / 1000.0;

        Self {
            iops: jobs.iter().map(|job| stats(job).iops).sum(),
            bandwidth_mib_s: jobs.iter().map(|job| stats(job).bw).sum::<f64>() / 1024.0,
            mean_latency_us: jobs.iter().map(|job| stats(job).lat_ns.mean).sum::<f64>()
                / jobs.len() as f64
                / 1000.0,
            p95_latency_us: percentile_us(95.0),
            p99_latency_us: percentile_us(99.0),
        }
    }
}
