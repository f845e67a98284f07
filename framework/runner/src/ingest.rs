use std::io;
use std::path::{Path, PathBuf};

use fio_control_summary_model::{ParsedResult, ResultError};

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Could not read results from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Could not parse results in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ResultError,
    },
    #[error("Results in {} are unusable: {reason}", path.display())]
    Schema { path: PathBuf, reason: String },
}

/// Load fio's JSON results for a finished run.
pub fn ingest(path: &Path) -> Result<ParsedResult, IngestionError> {
    let bytes = std::fs::read(path).map_err(|source| IngestionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    ParsedResult::from_slice(&bytes).map_err(|source| match source {
        ResultError::NoJobs => IngestionError::Schema {
            path: path.to_path_buf(),
            reason: source.to_string(),
        },
        source => IngestionError::Parse {
            path: path.to_path_buf(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const RANDREAD: &str = include_str!("../../summary_model/test_data/randread_4k.json");

    #[test]
    fn ingests_valid_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, RANDREAD).unwrap();

        let result = ingest(&path).unwrap();
        assert_eq!(1, result.jobs().len());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ingest(&dir.path().join("results.json")).unwrap_err();
        assert!(matches!(err, IngestionError::Read { .. }), "{err:?}");
    }

    #[test]
    fn truncated_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, &RANDREAD[..100]).unwrap();

        let err = ingest(&path).unwrap_err();
        assert!(matches!(err, IngestionError::Parse { .. }), "{err:?}");
        assert!(err.to_string().starts_with("Could not parse results in "));
    }

    #[test]
    fn empty_job_list_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, r#"{"fio version": "fio-3.36", "jobs": []}"#).unwrap();

        let err = ingest(&path).unwrap_err();
        assert!(matches!(err, IngestionError::Schema { .. }), "{err:?}");
    }
}
