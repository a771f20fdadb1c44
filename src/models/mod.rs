//! Domain models for address aggregation.
//!
//! This module contains the core data structures used throughout the application:
//! - [`AddressFamily`] with the [`V4`] and [`V6`] families, plus the runtime [`Family`] tag
//! - [`Cidr`] - an aligned CIDR block
//! - [`Interval`] - an inclusive address range

mod cidr;
mod family;

// Re-export public types
pub use cidr::{parse_addr, parse_prefix, Cidr, Interval};
pub use family::{
    broadcast_addr, cut_addr, get_cidr_mask, host_mask, lo_mask, AddressBits, AddressFamily,
    Family, V4, V6,
};
