//! Caller address normalization.

/// Prefix a dual-stack listener puts in front of IPv4 peers.
pub const IPV4_MAPPED_PREFIX: &str = "::ffff:";

/// Strip the IPv4-mapped-IPv6 prefix so the address compares equal to the
/// plain IPv4 form the device directory reports.
///
/// Only one prefix is removed; anything else is returned unchanged.
#[must_use]
pub fn normalize_client_address(raw: &str) -> String {
    raw.strip_prefix(IPV4_MAPPED_PREFIX).unwrap_or(raw).to_string()
}
