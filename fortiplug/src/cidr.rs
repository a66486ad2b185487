//! IPv4 subnet notation helpers.
//!
//! FortiOS reports subnets as `"10.0.0.0 255.255.255.0"` while users
//! usually write `"10.0.0.0/24"`.

use ipnet::{ipv4_mask_to_prefix, Ipv4Net};
use std::net::Ipv4Addr;

/// Prefix length of a contiguous netmask, `None` for masks like `255.0.255.0`.
pub fn mask_prefix_len(mask: Ipv4Addr) -> Option<u8> {
    ipv4_mask_to_prefix(mask).ok()
}

/// `"addr mask"` to `"addr/len"`.
pub fn ip_mask_to_cidr(value: &str) -> Option<String> {
    let mut parts = value.split_whitespace();
    let addr: Ipv4Addr = parts.next()?.parse().ok()?;
    let mask: Ipv4Addr = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let net = Ipv4Net::new(addr, mask_prefix_len(mask)?).ok()?;
    Some(net.to_string())
}

fn is_ipv4_cidr(value: &str) -> bool {
    value.parse::<Ipv4Net>().is_ok()
}

/// Rewrites a device subnet into CIDR form when the prior local value
/// (`hint`) is written that way. Anything else is returned unchanged.
pub fn normalize_ipv4_subnet(device: &str, hint: Option<&str>) -> String {
    if hint.is_some_and(is_ipv4_cidr) {
        if let Some(cidr) = ip_mask_to_cidr(device) {
            return cidr;
        }
    }
    device.to_string()
}
