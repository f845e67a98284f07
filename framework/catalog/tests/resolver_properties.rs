use fio_control_catalog::{resolve, Catalog, RunOverrides, RunSelection};
use proptest::prelude::*;

fn catalog() -> Catalog {
    Catalog::embedded().expect("embedded catalog should parse")
}

fn name() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("quick".to_string())),
        Just(Some("standard".to_string())),
        Just(Some("oltp".to_string())),
        Just(Some("olap".to_string())),
        Just(Some("vdi".to_string())),
        Just(Some("read_only_mix".to_string())),
        Just(Some("nvme".to_string())),
        Just(Some("hdd".to_string())),
        "[a-z_]{0,12}".prop_map(Some),
    ]
}

fn overrides() -> impl Strategy<Value = RunOverrides> {
    (
        proptest::option::of(prop_oneof![Just("4k"), Just("64k"), Just("1m")]),
        proptest::option::of(1u32..512),
        proptest::option::of(1u32..64),
        proptest::option::of(prop_oneof![Just("256M"), Just("8G")]),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(|(bs, qd, jobs, size, direct)| RunOverrides {
            block_size: bs.map(str::to_string),
            queue_depth: qd,
            job_count: jobs,
            size: size.map(str::to_string),
            direct,
        })
}

fn selection() -> impl Strategy<Value = RunSelection> {
    (name(), name(), name(), overrides()).prop_map(|(scenario, workload, storage_type, overrides)| {
        RunSelection {
            scenario,
            workload,
            storage_type,
            overrides,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn resolution_is_deterministic(selection in selection()) {
        let catalog = catalog();
        let first = resolve(&catalog, &selection).unwrap();
        let second = resolve(&catalog, &selection).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn overrides_take_precedence(selection in selection()) {
        let catalog = catalog();
        let params = resolve(&catalog, &selection).unwrap();
        let overrides = &selection.overrides;

        if let Some(bs) = &overrides.block_size {
            prop_assert_eq!(bs.as_str(), params.block_size());
        }
        if let Some(qd) = overrides.queue_depth {
            prop_assert_eq!(qd, params.queue_depth());
        }
        if let Some(jobs) = overrides.job_count {
            prop_assert_eq!(jobs, params.job_count());
        }
        if let Some(size) = &overrides.size {
            prop_assert_eq!(size.as_str(), params.size());
        }
        if let Some(direct) = overrides.direct {
            prop_assert_eq!(direct, params.direct());
        }
    }

    #[test]
    fn storage_type_beats_workload_without_overrides(selection in selection()) {
        let mut selection = selection;
        selection.overrides = RunOverrides::default();

        let catalog = catalog();
        let params = resolve(&catalog, &selection).unwrap();

        if let Some(storage) = selection.storage_type.as_deref().and_then(|k| catalog.storage_type(k)) {
            if let Some(qd) = storage.recommended_iodepth {
                prop_assert_eq!(qd, params.queue_depth());
            }
            if let Some(jobs) = storage.recommended_numjobs {
                prop_assert_eq!(jobs, params.job_count());
            }
        }
    }

    #[test]
    fn mixed_flag_only_below_100(selection in selection()) {
        let params = resolve(&catalog(), &selection).unwrap();

        match params.mixed_read_flag() {
            Some(pct) => {
                prop_assert!(params.pattern().is_mixed());
                prop_assert!(pct < 100);
            }
            None => prop_assert!(!params.pattern().is_mixed() || params.mixed_read_pct() == 100),
        }
    }
}
