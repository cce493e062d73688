//! Fuzz target for group-set classification.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_group_classification -- -max_total_time=600

#![no_main]

use devgroup_pihole::{classify_groups, GroupState, UnresolvedReason};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let groups: Vec<u32> = data.iter().map(|b| u32::from(*b % 4)).collect();

    match classify_groups(Some(groups.as_slice())) {
        GroupState::SteadyState(custom) => {
            assert_eq!(groups.len(), 2);
            assert_ne!(custom, 0);
            assert!(groups.contains(&0));
            assert!(groups.contains(&custom));
        }
        GroupState::NeedsProvisioning => assert_eq!(groups, vec![0]),
        GroupState::Unresolved(UnresolvedReason::InvariantMismatch(seen)) => {
            assert_eq!(seen, groups);
        }
        GroupState::Unresolved(UnresolvedReason::NoRecord) => {
            panic!("a present group set is never NoRecord")
        }
    }
});
