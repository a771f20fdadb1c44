//! Ordering of raw CIDR string lists.

use crate::models::{parse_addr, AddressBits, AddressFamily, Family, V4, V6};

/// Sort CIDR strings of one family by numeric address, ignoring the prefix length.
///
/// Entries whose address does not parse sort last, keeping their relative order.
pub fn sort_cidrs(cidrs: &mut [String], family: Family) {
    match family {
        Family::Ipv4 => sort_by_addr::<V4>(cidrs),
        Family::Ipv6 => sort_by_addr::<V6>(cidrs),
    }
}

fn sort_by_addr<F: AddressFamily>(cidrs: &mut [String]) {
    cidrs.sort_by_cached_key(|cidr| {
        let addr = cidr.split('/').next().unwrap_or_default();
        match parse_addr::<F>(addr) {
            Ok(bits) => (false, bits),
            Err(_) => (true, F::Bits::MAX),
        }
    });
}
