use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Result type for the glue code around runs, such as locating the fio binary. Compatible with
/// `anyhow` so callers can use `?` freely.
pub type FioControlResult<T> = anyhow::Result<T>;

const RUN_ID_SUFFIX_ALPHABET: [char; 36] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Identifies a run, and the artifacts it writes, for the lifetime of the run.
///
/// Made of the launch time at second resolution followed by a short random suffix, for example
/// `20261018_143005-k3x9qa`. The suffix keeps runs started within the same second apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn generate() -> Self {
        Self::generate_at(Local::now())
    }

    pub(crate) fn generate_at(now: DateTime<Local>) -> Self {
        let suffix = nanoid::nanoid!(6, &RUN_ID_SUFFIX_ALPHABET);
        Self(format!("{}-{suffix}", now.format("%Y%m%d_%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RunId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RunId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The state an observer keeps between polls of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHandle {
    pub run_id: RunId,
    pub log_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn run_id_starts_with_timestamp() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 5).unwrap();
        let id = RunId::generate_at(now);

        let (timestamp, suffix) = id.as_str().split_once('-').unwrap();
        assert_eq!("20261018_143005", timestamp);
        assert_eq!(6, suffix.len());
        assert!(suffix.chars().all(|c| RUN_ID_SUFFIX_ALPHABET.contains(&c)));
    }

    #[test]
    fn same_second_ids_differ() {
        let now = Local.with_ymd_and_hms(2026, 10, 18, 14, 30, 5).unwrap();
        let ids = (0..50)
            .map(|_| RunId::generate_at(now))
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(50, ids.len());
    }

    #[test]
    fn handle_serializes_flat_run_id() {
        let handle = RunHandle {
            run_id: RunId::from("20261018_143005-abc123"),
            log_file: PathBuf::from("/tmp/log_20261018_143005-abc123.txt"),
        };
        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!("20261018_143005-abc123", json["run_id"]);
    }
}
