//! Property-based tests for slot aggregation.
//!
//! Uses `proptest` to verify the record-count invariants across many random
//! discovered sets.

#![allow(clippy::expect_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use podstat_common::InstanceState;
use stats_server::domain::{ContainerStatus, InstancePhase, RawInstance, aggregate};

fn arb_instance() -> impl Strategy<Value = RawInstance> {
    (
        "[a-z]{1,8}",
        prop_oneof![
            (0u32..12).prop_map(|i| Some(i.to_string())),
            Just(None),
            "[a-z-]{1,4}".prop_map(Some),
        ],
        prop::collection::vec((any::<bool>(), any::<bool>()), 0..3),
    )
        .prop_map(|(name, index, statuses)| RawInstance {
            name,
            index,
            phase: InstancePhase::Running,
            container_statuses: statuses
                .into_iter()
                .map(|(ready, running)| ContainerStatus { ready, running })
                .collect(),
        })
}

proptest! {
    /// Exactly one record per desired slot, whatever was discovered.
    #[test]
    fn prop_one_record_per_slot(
        desired in 0u32..10,
        instances in prop::collection::vec(arb_instance(), 0..16),
    ) {
        let records = aggregate("web", desired, instances);

        prop_assert_eq!(records.len(), desired as usize);
        let indices: BTreeSet<u32> = records.iter().map(|r| r.index).collect();
        prop_assert_eq!(indices, (0..desired).collect::<BTreeSet<u32>>());
    }

    /// A slot nobody claims is always DOWN.
    #[test]
    fn prop_unclaimed_slots_are_down(
        desired in 1u32..10,
        instances in prop::collection::vec(arb_instance(), 0..16),
    ) {
        let claimed: BTreeSet<u32> = instances
            .iter()
            .filter_map(|i| i.index.as_deref()?.parse().ok())
            .collect();
        let records = aggregate("web", desired, instances);

        for record in records.iter().filter(|r| !claimed.contains(&r.index)) {
            prop_assert_eq!(record.state, InstanceState::Down);
        }
    }

    /// RUNNING requires a container that is both running and ready.
    #[test]
    fn prop_running_requires_running_and_ready(
        instances in prop::collection::vec(arb_instance(), 0..16),
    ) {
        let serving: BTreeSet<u32> = instances
            .iter()
            .filter(|i| i.container_statuses.iter().any(|c| c.running && c.ready))
            .filter_map(|i| i.index.as_deref()?.parse().ok())
            .collect();
        let records = aggregate("web", 12, instances);

        for record in records.iter().filter(|r| r.state == InstanceState::Running) {
            prop_assert!(
                serving.contains(&record.index),
                "slot {} has no serving instance",
                record.index
            );
        }
    }
}
