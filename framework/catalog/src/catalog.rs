use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::params::Pattern;
use crate::resolve::{DEFAULT_SCENARIO, DEFAULT_WORKLOAD};

/// The catalog that ships with fio-control.
pub const EMBEDDED_CATALOG: &str = include_str!("../fio_defaults.yaml");

/// A named duration and test file size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Seconds that fio runs for, excluding the ramp time.
    pub runtime: u64,
    /// Seconds of warm up that fio excludes from the results.
    #[serde(default)]
    pub ramp_time: u64,
    /// Size of the test file, in fio notation such as `4G`.
    pub size: String,
}

/// A named I/O pattern with suggested tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rw: Pattern,
    /// Percentage of reads for a mixed pattern. Absent means all reads.
    #[serde(default)]
    pub rwmixread: Option<u32>,
    #[serde(default)]
    pub bs: Option<String>,
    #[serde(default)]
    pub iodepth: Option<u32>,
    #[serde(default)]
    pub numjobs: Option<u32>,
}

/// Tuning hints for a class of storage device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageType {
    pub name: String,
    #[serde(default)]
    pub recommended_iodepth: Option<u32>,
    #[serde(default)]
    pub recommended_numjobs: Option<u32>,
}

/// A `label`/`value` pair, ready to populate a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetOption {
    pub label: String,
    pub value: String,
}

impl PresetOption {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Catalog has no {kind} named '{name}', which is required as the default")]
    MissingDefault { kind: &'static str, name: &'static str },
    #[error("Invalid {kind} '{name}' in catalog: {reason}")]
    Invalid {
        kind: &'static str,
        name: String,
        reason: String,
    },
}

/// Named presets that translate a handful of user selections into full run parameters.
///
/// Construct with [Catalog::embedded], [Catalog::load] or [Catalog::from_yaml_str]. All of them
/// validate the document so that resolution never has to deal with a malformed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    scenarios: BTreeMap<String, Scenario>,
    workloads: BTreeMap<String, Workload>,
    #[serde(default)]
    storage_types: BTreeMap<String, StorageType>,
    #[serde(default)]
    block_sizes: Vec<String>,
    #[serde(default)]
    queue_depths: Vec<u32>,
    #[serde(default)]
    job_counts: Vec<u32>,
}

impl Catalog {
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml_str(EMBEDDED_CATALOG)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_reader(reader)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !self.scenarios.contains_key(DEFAULT_SCENARIO) {
            return Err(CatalogError::MissingDefault {
                kind: "scenario",
                name: DEFAULT_SCENARIO,
            });
        }
        if !self.workloads.contains_key(DEFAULT_WORKLOAD) {
            return Err(CatalogError::MissingDefault {
                kind: "workload",
                name: DEFAULT_WORKLOAD,
            });
        }

        for (key, scenario) in &self.scenarios {
            if scenario.size.trim().is_empty() {
                return Err(invalid("scenario", key, "size must not be empty"));
            }
        }

        for (key, workload) in &self.workloads {
            if matches!(workload.rwmixread, Some(pct) if pct > 100) {
                return Err(invalid("workload", key, "rwmixread must be at most 100"));
            }
            if workload.iodepth == Some(0) || workload.numjobs == Some(0) {
                return Err(invalid("workload", key, "iodepth and numjobs must be at least 1"));
            }
            if matches!(&workload.bs, Some(bs) if bs.trim().is_empty()) {
                return Err(invalid("workload", key, "bs must not be empty"));
            }
        }

        for (key, storage) in &self.storage_types {
            if storage.recommended_iodepth == Some(0) || storage.recommended_numjobs == Some(0) {
                return Err(invalid(
                    "storage type",
                    key,
                    "recommended_iodepth and recommended_numjobs must be at least 1",
                ));
            }
        }

        Ok(())
    }

    pub fn scenario(&self, key: &str) -> Option<&Scenario> {
        self.scenarios.get(key)
    }

    pub fn workload(&self, key: &str) -> Option<&Workload> {
        self.workloads.get(key)
    }

    pub fn storage_type(&self, key: &str) -> Option<&StorageType> {
        self.storage_types.get(key)
    }

    pub fn scenario_options(&self) -> Vec<PresetOption> {
        self.scenarios
            .iter()
            .map(|(key, s)| PresetOption::new(s.name.as_deref().unwrap_or(key), key))
            .collect()
    }

    pub fn workload_options(&self) -> Vec<PresetOption> {
        self.workloads
            .iter()
            .map(|(key, w)| PresetOption::new(&w.name, key))
            .collect()
    }

    pub fn storage_type_options(&self) -> Vec<PresetOption> {
        self.storage_types
            .iter()
            .map(|(key, s)| PresetOption::new(&s.name, key))
            .collect()
    }

    pub fn block_size_options(&self) -> Vec<PresetOption> {
        self.block_sizes
            .iter()
            .map(|bs| PresetOption::new(bs, bs))
            .collect()
    }

    pub fn queue_depth_options(&self) -> Vec<PresetOption> {
        numeric_options(&self.queue_depths)
    }

    pub fn job_count_options(&self) -> Vec<PresetOption> {
        numeric_options(&self.job_counts)
    }
}

fn numeric_options(values: &[u32]) -> Vec<PresetOption> {
    values
        .iter()
        .map(|v| PresetOption::new(v.to_string(), v.to_string()))
        .collect()
}

fn invalid(kind: &'static str, name: &str, reason: &str) -> CatalogError {
    CatalogError::Invalid {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
