use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The I/O pattern fio should generate.
///
/// Serialised using fio's own `--rw` tokens so that catalog files can use the values fio users
/// already know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    #[serde(rename = "read")]
    SequentialRead,
    #[serde(rename = "write")]
    SequentialWrite,
    #[serde(rename = "randread")]
    RandomRead,
    #[serde(rename = "randwrite")]
    RandomWrite,
    #[serde(rename = "randrw")]
    RandomMixed,
}

impl Pattern {
    pub const ALL: [Pattern; 5] = [
        Pattern::SequentialRead,
        Pattern::SequentialWrite,
        Pattern::RandomRead,
        Pattern::RandomWrite,
        Pattern::RandomMixed,
    ];

    /// The value passed to fio's `--rw` flag.
    pub fn fio_token(&self) -> &'static str {
        match self {
            Pattern::SequentialRead => "read",
            Pattern::SequentialWrite => "write",
            Pattern::RandomRead => "randread",
            Pattern::RandomWrite => "randwrite",
            Pattern::RandomMixed => "randrw",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::SequentialRead => "sequential-read",
            Pattern::SequentialWrite => "sequential-write",
            Pattern::RandomRead => "random-read",
            Pattern::RandomWrite => "random-write",
            Pattern::RandomMixed => "random-mixed",
        }
    }

    /// Whether the pattern mixes reads and writes, which is when a read percentage applies.
    pub fn is_mixed(&self) -> bool {
        matches!(self, Pattern::RandomMixed)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = ParameterError;

    /// Accepts either the fio token (`randread`) or the descriptive name (`random-read`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|p| p.fio_token() == s || p.name() == s)
            .ok_or_else(|| ParameterError::UnknownPattern(s.to_string()))
    }
}

/// Errors raised when building [RunParameters] from invalid values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterError {
    #[error("Unknown I/O pattern '{0}'")]
    UnknownPattern(String),
    #[error("Missing required parameter '{0}'")]
    Missing(&'static str),
    #[error("Parameter '{0}' must not be empty")]
    Empty(&'static str),
    #[error("Parameter '{0}' must be at least 1")]
    Zero(&'static str),
    #[error("Mixed read percentage must be between 0 and 100, got {0}")]
    MixedReadOutOfRange(u32),
}

/// Fully resolved parameters for a single fio invocation.
///
/// Can only be created through a [RunParametersBuilder], which rejects values that fio would
/// refuse or misinterpret. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunParameters {
    pattern: Pattern,
    block_size: String,
    queue_depth: u32,
    job_count: u32,
    size: String,
    direct: bool,
    duration_secs: u64,
    ramp_secs: u64,
    mixed_read_pct: u8,
}

impl RunParameters {
    pub fn builder() -> RunParametersBuilder {
        RunParametersBuilder::default()
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    pub fn block_size(&self) -> &str {
        &self.block_size
    }

    pub fn queue_depth(&self) -> u32 {
        self.queue_depth
    }

    pub fn job_count(&self) -> u32 {
        self.job_count
    }

    pub fn size(&self) -> &str {
        &self.size
    }

    pub fn direct(&self) -> bool {
        self.direct
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn ramp_secs(&self) -> u64 {
        self.ramp_secs
    }

    pub fn mixed_read_pct(&self) -> u8 {
        self.mixed_read_pct
    }

    /// The read percentage to pass to fio as `--rwmixread`, if any.
    ///
    /// Only a mixed pattern with less than 100% reads produces a value. A mix of 100% reads is
    /// a pure read workload and is left to the pattern alone.
    pub fn mixed_read_flag(&self) -> Option<u8> {
        (self.pattern.is_mixed() && self.mixed_read_pct < 100).then_some(self.mixed_read_pct)
    }
}

/// Used to build [RunParameters]. Every field apart from the direct flag, the ramp time and the
/// mixed read percentage is required.
#[derive(Debug, Clone, Default)]
pub struct RunParametersBuilder {
    pattern: Option<Pattern>,
    block_size: Option<String>,
    queue_depth: Option<u32>,
    job_count: Option<u32>,
    size: Option<String>,
    /// Defaults to `true`, bypassing the page cache.
    direct: Option<bool>,
    duration_secs: Option<u64>,
    /// Defaults to `0`.
    ramp_secs: Option<u64>,
    /// Defaults to `100`.
    mixed_read_pct: Option<u32>,
}

impl RunParametersBuilder {
    pub fn pattern(&mut self, pattern: Pattern) -> &mut Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn block_size(&mut self, block_size: impl Into<String>) -> &mut Self {
        self.block_size = Some(block_size.into());
        self
    }

    pub fn queue_depth(&mut self, queue_depth: u32) -> &mut Self {
        self.queue_depth = Some(queue_depth);
        self
    }

    pub fn job_count(&mut self, job_count: u32) -> &mut Self {
        self.job_count = Some(job_count);
        self
    }

    pub fn size(&mut self, size: impl Into<String>) -> &mut Self {
        self.size = Some(size.into());
        self
    }

    pub fn direct(&mut self, direct: bool) -> &mut Self {
        self.direct = Some(direct);
        self
    }

    pub fn duration_secs(&mut self, duration_secs: u64) -> &mut Self {
        self.duration_secs = Some(duration_secs);
        self
    }

    pub fn ramp_secs(&mut self, ramp_secs: u64) -> &mut Self {
        self.ramp_secs = Some(ramp_secs);
        self
    }

    pub fn mixed_read_pct(&mut self, mixed_read_pct: u32) -> &mut Self {
        self.mixed_read_pct = Some(mixed_read_pct);
        self
    }

    /// Validate the collected values and build [RunParameters].
    pub fn build(&self) -> Result<RunParameters, ParameterError> {
        let pattern = self.pattern.ok_or(ParameterError::Missing("pattern"))?;
        let block_size = non_empty("block_size", self.block_size.as_deref())?;
        let size = non_empty("size", self.size.as_deref())?;
        let queue_depth = at_least_one("queue_depth", self.queue_depth)?;
        let job_count = at_least_one("job_count", self.job_count)?;
        let duration_secs = self
            .duration_secs
            .ok_or(ParameterError::Missing("duration_secs"))?;

        let mixed_read_pct = match self.mixed_read_pct.unwrap_or(100) {
            pct @ 0..=100 => pct as u8,
            pct => return Err(ParameterError::MixedReadOutOfRange(pct)),
        };

        Ok(RunParameters {
            pattern,
            block_size,
            queue_depth,
            job_count,
            size,
            direct: self.direct.unwrap_or(true),
            duration_secs,
            ramp_secs: self.ramp_secs.unwrap_or(0),
            mixed_read_pct,
        })
    }
}

fn non_empty(field: &'static str, value: Option<&str>) -> Result<String, ParameterError> {
    match value.map(str::trim) {
        None => Err(ParameterError::Missing(field)),
        Some("") => Err(ParameterError::Empty(field)),
        Some(value) => Ok(value.to_string()),
    }
}

fn at_least_one(field: &'static str, value: Option<u32>) -> Result<u32, ParameterError> {
    match value {
        None => Err(ParameterError::Missing(field)),
        Some(0) => Err(ParameterError::Zero(field)),
        Some(value) => Ok(value),
    }
}
