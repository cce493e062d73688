//! Identity resolution over directory snapshots.

use crate::models::{ClientRecord, Device};

/// Prefix of every group this crate provisions.
pub const GROUP_NAME_PREFIX: &str = "group-for-";

/// Find the hardware address of the device that lists `address`.
///
/// Devices are scanned in directory order and the first device listing the
/// address wins; later devices are never inspected. Entries without a
/// hardware address are skipped.
#[must_use]
pub fn resolve_hardware_address<'a>(devices: &'a [Device], address: &str) -> Option<&'a str> {
    devices.iter().find_map(|device| {
        let hwaddr = device.hwaddr.as_deref().filter(|hw| !hw.is_empty())?;
        device
            .ips
            .iter()
            .any(|entry| !entry.ip.is_empty() && entry.ip == address)
            .then_some(hwaddr)
    })
}

/// Find the client record keyed by `hardware_address`, ignoring case.
#[must_use]
pub fn find_client_record<'a>(
    records: &'a [ClientRecord],
    hardware_address: &str,
) -> Option<&'a ClientRecord> {
    records
        .iter()
        .find(|record| record.client.eq_ignore_ascii_case(hardware_address))
}

/// Canonical form of a hardware address used for every write.
#[must_use]
pub fn canonical_hardware_address(hardware_address: &str) -> String {
    hardware_address.trim().to_ascii_uppercase()
}

/// Deterministic group name for a hardware address.
#[must_use]
pub fn group_name_for(hardware_address: &str) -> String {
    let safe: String = canonical_hardware_address(hardware_address)
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .collect();
    format!("{GROUP_NAME_PREFIX}{safe}")
}

/// Comment attached to a provisioned group.
#[must_use]
pub fn group_comment_for(hardware_address: &str) -> String {
    format!(
        "Auto-created for {}",
        canonical_hardware_address(hardware_address)
    )
}
