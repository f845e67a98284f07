use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::params::{ParameterError, Pattern, RunParameters};

/// Scenario used when none is selected or the selection is not in the catalog.
pub const DEFAULT_SCENARIO: &str = "standard";
/// Workload preset used when none is selected or the selection is not in the catalog.
pub const DEFAULT_WORKLOAD: &str = "oltp";

/// Used if a workload preset has no block size suggestion.
pub const FALLBACK_BLOCK_SIZE: &str = "4k";
/// Used if a workload preset has no queue depth suggestion.
pub const FALLBACK_QUEUE_DEPTH: u32 = 32;
/// Used if a workload preset has no job count suggestion.
pub const FALLBACK_JOB_COUNT: u32 = 4;

/// Values chosen explicitly by the user. Any value set here wins over both the workload preset
/// and the storage type hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOverrides {
    pub block_size: Option<String>,
    pub queue_depth: Option<u32>,
    pub job_count: Option<u32>,
    pub size: Option<String>,
    pub direct: Option<bool>,
}

/// The user's selection, before it is resolved against a [Catalog].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSelection {
    pub scenario: Option<String>,
    pub workload: Option<String>,
    pub storage_type: Option<String>,
    #[serde(default)]
    pub overrides: RunOverrides,
}

/// Resolve a selection into concrete [RunParameters].
///
/// Precedence, from lowest to highest:
/// - the workload preset's suggestions (falling back to [DEFAULT_WORKLOAD]),
/// - the storage type's recommended queue depth and job count, when the hint is recognised,
/// - the explicit [RunOverrides].
///
/// The scenario (falling back to [DEFAULT_SCENARIO]) provides the runtime, ramp time and a default
/// size. This is a pure function, the only error is an override that produces invalid parameters.
pub fn resolve(catalog: &Catalog, selection: &RunSelection) -> Result<RunParameters, ParameterError> {
    let scenario = selection
        .scenario
        .as_deref()
        .and_then(|key| catalog.scenario(key))
        .or_else(|| catalog.scenario(DEFAULT_SCENARIO));
    let workload = selection
        .workload
        .as_deref()
        .and_then(|key| catalog.workload(key))
        .or_else(|| catalog.workload(DEFAULT_WORKLOAD));
    let storage = selection
        .storage_type
        .as_deref()
        .and_then(|key| catalog.storage_type(key));

    let mut builder = RunParameters::builder();

    match scenario {
        Some(scenario) => builder
            .duration_secs(scenario.runtime)
            .ramp_secs(scenario.ramp_time)
            .size(scenario.size.as_str()),
        // A validated catalog always has the default scenario, these values only matter for a
        // catalog that was built without validation.
        None => builder.duration_secs(60).ramp_secs(10).size("1G"),
    };

    let (pattern, mixed_read_pct) = workload
        .map(|w| (w.rw, w.rwmixread.unwrap_or(100)))
        .unwrap_or((Pattern::RandomRead, 100));
    let mut block_size = workload
        .and_then(|w| w.bs.clone())
        .unwrap_or_else(|| FALLBACK_BLOCK_SIZE.to_string());
    let mut queue_depth = workload
        .and_then(|w| w.iodepth)
        .unwrap_or(FALLBACK_QUEUE_DEPTH);
    let mut job_count = workload
        .and_then(|w| w.numjobs)
        .unwrap_or(FALLBACK_JOB_COUNT);

    if let Some(storage) = storage {
        queue_depth = storage.recommended_iodepth.unwrap_or(queue_depth);
        job_count = storage.recommended_numjobs.unwrap_or(job_count);
    }

    let overrides = &selection.overrides;
    if let Some(bs) = &overrides.block_size {
        block_size = bs.clone();
    }
    if let Some(size) = &overrides.size {
        builder.size(size.as_str());
    }
    if let Some(direct) = overrides.direct {
        builder.direct(direct);
    }

    builder
        .pattern(pattern)
        .mixed_read_pct(mixed_read_pct)
        .block_size(block_size)
        .queue_depth(overrides.queue_depth.unwrap_or(queue_depth))
        .job_count(overrides.job_count.unwrap_or(job_count))
        .build()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn catalog() -> Catalog {
        Catalog::embedded().unwrap()
    }

    fn select(scenario: &str, workload: &str, storage: Option<&str>) -> RunSelection {
        RunSelection {
            scenario: Some(scenario.to_string()),
            workload: Some(workload.to_string()),
            storage_type: storage.map(str::to_string),
            overrides: RunOverrides::default(),
        }
    }

    #[test]
    fn resolves_scenario_and_workload() {
        let params = resolve(&catalog(), &select("quick", "web_server", None)).unwrap();

        assert_eq!(Pattern::RandomRead, params.pattern());
        assert_eq!("4k", params.block_size());
        assert_eq!(64, params.queue_depth());
        assert_eq!(8, params.job_count());
        assert_eq!("1G", params.size());
        assert_eq!(30, params.duration_secs());
        assert_eq!(5, params.ramp_secs());
        assert!(params.direct());
    }

    #[test]
    fn unknown_names_fall_back_to_defaults() {
        let fallback = resolve(&catalog(), &select("no-such", "no-such", Some("no-such"))).unwrap();
        let defaults = resolve(&catalog(), &RunSelection::default()).unwrap();
        let explicit = resolve(&catalog(), &select("standard", "oltp", None)).unwrap();

        assert_eq!(explicit, fallback);
        assert_eq!(explicit, defaults);
        assert_eq!(Pattern::RandomMixed, explicit.pattern());
        assert_eq!(Some(70), explicit.mixed_read_flag());
        assert_eq!(60, explicit.duration_secs());
    }

    #[test]
    fn storage_type_overrides_workload_suggestions() {
        let params = resolve(&catalog(), &select("standard", "web_server", Some("hdd"))).unwrap();

        assert_eq!(4, params.queue_depth());
        assert_eq!(1, params.job_count());
        // Storage types do not suggest a block size.
        assert_eq!("4k", params.block_size());
    }

    #[test]
    fn explicit_overrides_win() {
        let mut selection = select("standard", "web_server", Some("nvme"));
        selection.overrides = RunOverrides {
            block_size: Some("16k".to_string()),
            queue_depth: Some(2),
            job_count: Some(3),
            size: Some("512M".to_string()),
            direct: Some(false),
        };

        let params = resolve(&catalog(), &selection).unwrap();

        assert_eq!("16k", params.block_size());
        assert_eq!(2, params.queue_depth());
        assert_eq!(3, params.job_count());
        assert_eq!("512M", params.size());
        assert!(!params.direct());
    }

    #[test]
    fn full_read_mix_emits_no_flag() {
        let params = resolve(&catalog(), &select("quick", "read_only_mix", None)).unwrap();

        assert_eq!(Pattern::RandomMixed, params.pattern());
        assert_eq!(100, params.mixed_read_pct());
        assert_eq!(None, params.mixed_read_flag());
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut selection = RunSelection::default();
        selection.overrides.queue_depth = Some(0);

        assert_eq!(
            ParameterError::Zero("queue_depth"),
            resolve(&catalog(), &selection).unwrap_err()
        );
    }
}
