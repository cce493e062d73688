//! Fuzz target for caller address normalization.
//!
//! Run with:
//! cargo +nightly fuzz run fuzz_address_normalize -- -max_total_time=600

#![no_main]

use devgroup_pihole::address::{normalize_client_address, IPV4_MAPPED_PREFIX};
use devgroup_pihole::lookup::group_name_for;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let normalized = normalize_client_address(raw);

    // Exactly one prefix is removed, nothing else changes
    if let Some(rest) = raw.strip_prefix(IPV4_MAPPED_PREFIX) {
        assert_eq!(normalized, rest);
    } else {
        assert_eq!(normalized, raw);
    }

    // Stable once no prefix is left
    if !normalized.starts_with(IPV4_MAPPED_PREFIX) {
        assert_eq!(normalize_client_address(&normalized), normalized);
    }

    // Group names never carry separators and ignore input case
    let name = group_name_for(raw);
    assert!(!name.contains(':'));
    assert!(!name.contains('.'));
    assert_eq!(name, group_name_for(&raw.to_ascii_lowercase()));
});
