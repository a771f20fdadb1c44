//! Range expansion.
//!
//! Turns CIDR strings into inclusive numeric intervals.

use crate::error::{CidrError, EntryError};
use crate::models::{AddressFamily, Cidr, Interval};

/// Expand one `address/prefix` string into `[network, broadcast]`.
pub fn expand<F: AddressFamily>(cidr: &str) -> Result<Interval<F>, CidrError> {
    Cidr::<F>::new(cidr).map(|net| net.interval())
}

/// Expand a batch, keeping every failure with its position instead of stopping at the first.
pub fn expand_all<F, S>(cidrs: &[S]) -> (Vec<Interval<F>>, Vec<EntryError>)
where
    F: AddressFamily,
    S: AsRef<str>,
{
    let mut intervals = Vec::with_capacity(cidrs.len());
    let mut rejected = Vec::new();

    for (index, cidr) in cidrs.iter().enumerate() {
        let cidr = cidr.as_ref();
        match expand::<F>(cidr) {
            Ok(range) => intervals.push(range),
            Err(error) => {
                log::trace!("reject #{index} '{cidr}': {error}");
                rejected.push(EntryError {
                    index,
                    input: cidr.to_string(),
                    error,
                });
            }
        }
    }

    (intervals, rejected)
}
