//! CIDR block and address interval types, generic over the address family.

use super::family::{broadcast_addr, cut_addr, AddressFamily};
use crate::error::CidrError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Parse an address of family `F`.
pub fn parse_addr<F: AddressFamily>(addr: &str) -> Result<F::Bits, CidrError> {
    addr.trim()
        .parse::<F::Addr>()
        .map(F::to_bits)
        .map_err(|_| CidrError::InvalidAddress {
            family: F::FAMILY,
            addr: addr.to_string(),
        })
}

/// Parse a base-10 prefix length and check it against the family's width.
pub fn parse_prefix<F: AddressFamily>(len: &str) -> Result<u8, CidrError> {
    if len.is_empty() || !len.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CidrError::InvalidPrefix(len.to_string()));
    }
    let prefix: u32 = len
        .parse()
        .map_err(|_| CidrError::InvalidPrefix(len.to_string()))?;
    if prefix > u32::from(F::MAX_LENGTH) {
        return Err(CidrError::PrefixOutOfRange {
            prefix,
            max: F::MAX_LENGTH,
        });
    }
    Ok(prefix as u8)
}

/// A CIDR block: aligned network address plus prefix length.
///
/// The address is always the network address; host bits given on input are cut off.
/// Ordering is by address, then by prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cidr<F: AddressFamily> {
    /// The network address.
    pub addr: F::Addr,
    /// The prefix length (0..=F::MAX_LENGTH).
    pub mask: u8,
}

impl<F: AddressFamily> Cidr<F> {
    /// Parse `address/prefix` (e.g. "10.0.0.0/24" or "2001:db8::/32").
    pub fn new(addr_cidr: &str) -> Result<Cidr<F>, CidrError> {
        let (addr, len) = addr_cidr
            .trim()
            .split_once('/')
            .ok_or(CidrError::MissingPrefix)?;
        let bits = parse_addr::<F>(addr)?;
        let mask = parse_prefix::<F>(len.trim())?;
        Ok(Cidr::from_bits(bits, mask))
    }

    /// Block of prefix `mask` containing `bits`. `mask` must be a valid length for `F`.
    pub(crate) fn from_bits(bits: F::Bits, mask: u8) -> Cidr<F> {
        Cidr {
            addr: F::from_bits(cut_addr::<F>(bits, mask)),
            mask,
        }
    }

    /// The lowest (network) address as an integer.
    pub fn lo(&self) -> F::Bits {
        F::to_bits(self.addr)
    }

    /// The highest address in the block as an integer.
    pub fn hi(&self) -> F::Bits {
        broadcast_addr::<F>(self.lo(), self.mask)
    }

    /// The highest address in the block.
    pub fn broadcast(&self) -> F::Addr {
        F::from_bits(self.hi())
    }

    pub fn interval(&self) -> Interval<F> {
        Interval {
            start: self.lo(),
            end: self.hi(),
        }
    }

    pub fn contains(&self, bits: F::Bits) -> bool {
        self.lo() <= bits && bits <= self.hi()
    }
}

impl<F: AddressFamily> fmt::Display for Cidr<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl<F: AddressFamily> Serialize for Cidr<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, F: AddressFamily> Deserialize<'de> for Cidr<F> {
    fn deserialize<D>(deserializer: D) -> Result<Cidr<F>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::new(&s).map_err(|e| de::Error::custom(format!("invalid CIDR '{s}': {e}")))
    }
}

/// Inclusive address interval `[start, end]`, not necessarily CIDR-aligned.
///
/// Invariant: `start <= end`. [`Interval::new`] enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<F: AddressFamily> {
    pub start: F::Bits,
    pub end: F::Bits,
}

impl<F: AddressFamily> Interval<F> {
    pub fn new(start: F::Bits, end: F::Bits) -> Result<Interval<F>, CidrError> {
        if start > end {
            return Err(CidrError::InvertedRange {
                start: F::from_bits(start).to_string(),
                end: F::from_bits(end).to_string(),
            });
        }
        Ok(Interval { start, end })
    }

    /// Interval between two address strings, both inclusive.
    pub fn from_boundaries(start: &str, end: &str) -> Result<Interval<F>, CidrError> {
        Interval::new(parse_addr::<F>(start)?, parse_addr::<F>(end)?)
    }

    pub fn contains(&self, bits: F::Bits) -> bool {
        self.start <= bits && bits <= self.end
    }
}

impl<F: AddressFamily> fmt::Display for Interval<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            F::from_bits(self.start),
            F::from_bits(self.end)
        )
    }
}
