//! Address range processing.
//!
//! This module contains the aggregation engine:
//! - [`expand`] - CIDR strings to numeric intervals
//! - [`merge`] - Coalescing overlapping and adjacent intervals
//! - [`split`] - Intervals back to maximal aligned CIDR blocks
//! - [`aggregate`] - The three steps above as one call
//! - [`sort_cidrs`] - Numeric ordering of raw CIDR string lists

mod aggregate;
mod expand;
mod merge;
mod sort;
mod split;

// Re-export public functions
pub use aggregate::{
    aggregate, aggregate_intervals, aggregate_lenient, aggregate_strings, range_to_cidr_strings,
    range_to_cidrs, Aggregated,
};
pub(crate) use aggregate::to_strings;
pub use expand::{expand, expand_all};
pub use merge::merge;
pub use sort::sort_cidrs;
pub use split::split;
