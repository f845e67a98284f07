//! The preset catalog and the pure resolution of a user's selection into fio run parameters.

mod catalog;
mod params;
mod resolve;

pub use crate::catalog::{
    Catalog, CatalogError, PresetOption, Scenario, StorageType, Workload, EMBEDDED_CATALOG,
};
pub use crate::params::{ParameterError, Pattern, RunParameters, RunParametersBuilder};
pub use crate::resolve::{
    resolve, RunOverrides, RunSelection, DEFAULT_SCENARIO, DEFAULT_WORKLOAD, FALLBACK_BLOCK_SIZE,
    FALLBACK_JOB_COUNT, FALLBACK_QUEUE_DEPTH,
};
