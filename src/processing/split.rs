//! CIDR re-splitting.
//!
//! Decomposes an arbitrary interval into maximal aligned power-of-two blocks.

use crate::models::{host_mask, lo_mask, AddressBits, AddressFamily, Cidr, Interval};

/// Split `[start, end]` into the minimal ordered list of CIDR blocks covering exactly it.
///
/// Each block starts with the largest prefix `start` is aligned to, then shrinks
/// until it ends at or before `end`.
pub fn split<F: AddressFamily>(range: Interval<F>) -> Vec<Cidr<F>> {
    let mut cidrs = Vec::new();
    let mut start = range.start;

    loop {
        let next_mask = find_biggest_block::<F>(start, range.end);
        cidrs.push(Cidr::from_bits(start, next_mask));

        let block_end = start | host_mask::<F>(next_mask);
        if block_end >= range.end {
            break;
        }
        // block_end < range.end <= MAX, so this cannot overflow
        start = block_end + F::Bits::ONE;
    }

    cidrs
}

/// Smallest prefix length whose block at `start` is aligned and stays within `end`.
fn find_biggest_block<F: AddressFamily>(start: F::Bits, end: F::Bits) -> u8 {
    debug_assert!(start <= end);
    let remaining = end - start;

    let mut next_mask = lo_mask::<F>(start);
    // host_mask(MAX_LENGTH) is zero, so this stops at MAX_LENGTH at the latest
    while host_mask::<F>(next_mask) > remaining {
        next_mask += 1;
    }
    next_mask
}
