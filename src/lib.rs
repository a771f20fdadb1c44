//! Cloud IP Lists
//!
//! Collects the IP ranges published by cloud providers and reduces every list to the
//! minimal sorted set of CIDR blocks covering the same addresses.
//!
//! # Module Structure
//!
//! - [`models`] - Address families, CIDR blocks and intervals
//! - [`processing`] - The aggregation engine (expand, merge, split)
//! - [`providers`] - Provider document and ip2asn parsing
//! - [`fetch`] - Concurrent downloads
//! - [`output`] - List files and the terminal summary
//! - [`pipeline`] - The update and ip2asn runs
//! - [`cli`] - Command line options
//! - [`config`] - Source lists, ASN map and settings
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod providers;

pub use error::{AggregateError, CidrError, ConfigError, EntryError, FetchError, ProviderError};
pub use models::{Cidr, Family, Interval, V4, V6};
pub use processing::{aggregate, aggregate_lenient, aggregate_strings, range_to_cidr_strings};
pub use providers::{Provider, ProviderLists};
