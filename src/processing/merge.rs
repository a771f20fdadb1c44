//! Interval merging.
//!
//! Sorts intervals and coalesces overlapping or touching ones into a disjoint set.

use crate::models::{AddressBits, AddressFamily, Interval};

/// Merge intervals into the minimal disjoint set covering the same addresses.
///
/// The result is sorted by start and, for neighbours `a` and `b`,
/// `a.end + 1 < b.start` holds: adjacent intervals are coalesced too.
pub fn merge<F: AddressFamily>(mut intervals: Vec<Interval<F>>) -> Vec<Interval<F>> {
    intervals.sort_by_key(|range| range.start);

    let mut merged: Vec<Interval<F>> = Vec::with_capacity(intervals.len());
    for next in intervals {
        match merged.last_mut() {
            Some(last) if touches::<F>(last.end, next.start) => {
                last.end = last.end.max(next.end);
            }
            _ => merged.push(next),
        }
    }

    log::trace!("merged into {} interval(s)", merged.len());
    merged
}

/// True when `start` overlaps or directly follows `end`.
///
/// An `end` at the top of the address space has no successor, so everything touches it.
fn touches<F: AddressFamily>(end: F::Bits, start: F::Bits) -> bool {
    match end.checked_add(F::Bits::ONE) {
        Some(after_end) => start <= after_end,
        None => true,
    }
}
