//! CIDR aggregation.
//!
//! Expand, merge and re-split: the full pipeline from CIDR strings to the
//! minimal sorted CIDR list covering the same addresses.

use super::expand::expand_all;
use super::merge::merge;
use super::split::split;
use crate::error::{AggregateError, CidrError, EntryError};
use crate::models::{AddressFamily, Cidr, Family, Interval, V4, V6};

/// Result of a lenient aggregation: the valid subset aggregated, plus what was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated<F: AddressFamily> {
    pub cidrs: Vec<Cidr<F>>,
    pub rejected: Vec<EntryError>,
}

/// Aggregate CIDR strings of family `F` into the minimal sorted list of blocks.
///
/// Any malformed entry fails the whole call; the error lists all of them.
///
/// ```
/// use cloud_ip_lists::models::V4;
/// use cloud_ip_lists::processing::aggregate;
///
/// let cidrs = aggregate::<V4, _>(&["10.10.10.8/32", "10.10.10.9/32"]).unwrap();
/// assert_eq!(cidrs[0].to_string(), "10.10.10.8/31");
/// ```
pub fn aggregate<F, S>(cidrs: &[S]) -> Result<Vec<Cidr<F>>, AggregateError>
where
    F: AddressFamily,
    S: AsRef<str>,
{
    let (intervals, rejected) = expand_all::<F, S>(cidrs);
    if !rejected.is_empty() {
        return Err(AggregateError {
            family: F::FAMILY,
            entries: rejected,
        });
    }
    Ok(aggregate_intervals(intervals))
}

/// Aggregate the valid entries and hand back the rejected ones for the caller to report.
pub fn aggregate_lenient<F, S>(cidrs: &[S]) -> Aggregated<F>
where
    F: AddressFamily,
    S: AsRef<str>,
{
    let (intervals, rejected) = expand_all::<F, S>(cidrs);
    Aggregated {
        cidrs: aggregate_intervals(intervals),
        rejected,
    }
}

/// Merge and re-split already expanded intervals.
pub fn aggregate_intervals<F: AddressFamily>(intervals: Vec<Interval<F>>) -> Vec<Cidr<F>> {
    let count = intervals.len();
    let cidrs: Vec<Cidr<F>> = merge(intervals).into_iter().flat_map(split).collect();
    log::debug!(
        "aggregated {count} {} range(s) into {} CIDR(s)",
        F::FAMILY,
        cidrs.len()
    );
    cidrs
}

/// String-in, string-out aggregation for a family chosen at runtime.
pub fn aggregate_strings<S: AsRef<str>>(
    cidrs: &[S],
    family: Family,
) -> Result<Vec<String>, AggregateError> {
    match family {
        Family::Ipv4 => aggregate::<V4, S>(cidrs).map(to_strings),
        Family::Ipv6 => aggregate::<V6, S>(cidrs).map(to_strings),
    }
}

/// Minimal CIDR blocks covering the inclusive range between two addresses.
pub fn range_to_cidrs<F: AddressFamily>(start: &str, end: &str) -> Result<Vec<Cidr<F>>, CidrError> {
    Interval::<F>::from_boundaries(start, end).map(split)
}

/// [`range_to_cidrs`] for a family chosen at runtime.
pub fn range_to_cidr_strings(
    start: &str,
    end: &str,
    family: Family,
) -> Result<Vec<String>, CidrError> {
    match family {
        Family::Ipv4 => range_to_cidrs::<V4>(start, end).map(to_strings),
        Family::Ipv6 => range_to_cidrs::<V6>(start, end).map(to_strings),
    }
}

pub(crate) fn to_strings<F: AddressFamily>(cidrs: Vec<Cidr<F>>) -> Vec<String> {
    cidrs.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg4(input: &[&str]) -> Vec<String> {
        aggregate_strings(input, Family::Ipv4).unwrap()
    }

    fn agg6(input: &[&str]) -> Vec<String> {
        aggregate_strings(input, Family::Ipv6).unwrap()
    }

    #[test]
    fn test_aggregate_adjacent_hosts() {
        assert_eq!(agg4(&["10.10.10.8/32", "10.10.10.9/32"]), vec!["10.10.10.8/31"]);
    }

    #[test]
    fn test_aggregate_overlap() {
        assert_eq!(agg4(&["10.0.0.0/24", "10.0.0.128/25"]), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_aggregate_non_contiguous() {
        assert_eq!(
            agg4(&["10.0.0.0/32", "10.0.0.2/32"]),
            vec!["10.0.0.0/32", "10.0.0.2/32"]
        );
    }

    #[test]
    fn test_aggregate_empty() {
        let empty: [&str; 0] = [];
        assert!(aggregate_strings(&empty, Family::Ipv4).unwrap().is_empty());
        assert!(aggregate_strings(&empty, Family::Ipv6).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_full_space() {
        assert_eq!(agg4(&["0.0.0.0/1", "128.0.0.0/1"]), vec!["0.0.0.0/0"]);
        assert_eq!(agg6(&["8000::/1", "::/1", "2001:db8::/32"]), vec!["::/0"]);
    }

    #[test]
    fn test_aggregate_unsorted_mixed_sizes() {
        assert_eq!(
            agg4(&[
                "192.168.1.0/24",
                "10.0.0.0/8",
                "192.168.0.0/24",
                "10.1.2.3/32",
                "172.16.0.0/13",
                "172.24.0.0/13",
            ]),
            vec!["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/23"]
        );
    }

    #[test]
    fn test_aggregate_not_merged_when_unaligned() {
        // adjacent /24s that do not form an aligned /23
        assert_eq!(
            agg4(&["10.0.1.0/24", "10.0.2.0/24"]),
            vec!["10.0.1.0/24", "10.0.2.0/24"]
        );
    }

    #[test]
    fn test_aggregate_v6() {
        assert_eq!(
            agg6(&["2001:db8::1/128", "2001:db8::2/128", "2001:db8::3/128", "2001:db8::/128"]),
            vec!["2001:db8::/126"]
        );
        assert_eq!(
            agg6(&["2600:1f00::/24", "2600:1f14::/35", "2a05:d000::/25", "2a05:d080::/25"]),
            vec!["2600:1f00::/24", "2a05:d000::/24"]
        );
    }

    #[test]
    fn test_aggregate_rejects_batch() {
        let err = aggregate_strings(&["10.0.0.0/8", "10.0.0.0/40", "nope/8"], Family::Ipv4)
            .unwrap_err();
        assert_eq!(err.family, Family::Ipv4);
        assert_eq!(err.entries.len(), 2);
        assert_eq!(err.entries[0].index, 1);
        assert_eq!(err.entries[1].input, "nope/8");
    }

    #[test]
    fn test_aggregate_wrong_family() {
        let err = aggregate_strings(&["10.0.0.0/8"], Family::Ipv6).unwrap_err();
        assert!(matches!(
            err.entries[0].error,
            CidrError::InvalidAddress { family: Family::Ipv6, .. }
        ));
    }

    #[test]
    fn test_aggregate_lenient() {
        let result = aggregate_lenient::<V4, _>(&["10.0.0.0/25", "bad", "10.0.0.128/25"]);
        assert_eq!(to_strings(result.cidrs), vec!["10.0.0.0/24"]);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].index, 1);
    }

    #[test]
    fn test_range_to_cidr_strings() {
        assert_eq!(
            range_to_cidr_strings(
                "2001:0db8:0000:0042:0000:8a2e:0370:7334",
                "2001:0db8:0000:0042:0000:8a2e:0370:7343",
                Family::Ipv6
            )
            .unwrap(),
            vec![
                "2001:db8:0:42:0:8a2e:370:7334/126",
                "2001:db8:0:42:0:8a2e:370:7338/125",
                "2001:db8:0:42:0:8a2e:370:7340/126",
            ]
        );
        assert_eq!(
            range_to_cidr_strings("1.0.0.0", "1.0.0.255", Family::Ipv4).unwrap(),
            vec!["1.0.0.0/24"]
        );
        assert!(range_to_cidr_strings("1.0.0.9", "1.0.0.1", Family::Ipv4).is_err());
        assert!(range_to_cidr_strings("1.0.0.1", "::1", Family::Ipv4).is_err());
    }
}
