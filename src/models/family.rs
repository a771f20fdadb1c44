//! Address families and the fixed-width integers behind them.
//!
//! The aggregation engine is written once against [`AddressFamily`]; [`V4`] and
//! [`V6`] plug in the 32-bit and 128-bit integer widths and the std address codecs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{Add, BitAnd, BitOr, Not, Shl, Sub};
use std::str::FromStr;

/// Unsigned integer wide enough to hold every address of a family.
pub trait AddressBits:
    Copy
    + Ord
    + Hash
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;
    const BITS: u32;

    fn trailing_zeros(self) -> u32;
    fn checked_add(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_address_bits {
    ($($t:ty),*) => {
        $(
            impl AddressBits for $t {
                const ZERO: Self = 0;
                const ONE: Self = 1;
                const MAX: Self = <$t>::MAX;
                const BITS: u32 = <$t>::BITS;

                fn trailing_zeros(self) -> u32 {
                    <$t>::trailing_zeros(self)
                }

                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }
            }
        )*
    };
}

impl_address_bits!(u32, u128);

/// An IP address family: its integer width and textual codec.
pub trait AddressFamily:
    Copy + fmt::Debug + Default + PartialEq + Eq + PartialOrd + Ord + Hash + Send + Sync + 'static
{
    type Bits: AddressBits;
    type Addr: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + FromStr;

    /// Maximum prefix length (32 or 128).
    const MAX_LENGTH: u8;
    const FAMILY: Family;

    fn to_bits(addr: Self::Addr) -> Self::Bits;
    fn from_bits(bits: Self::Bits) -> Self::Addr;
}

/// IPv4, 32-bit addresses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct V4;

/// IPv6, 128-bit addresses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct V6;

impl AddressFamily for V4 {
    type Bits = u32;
    type Addr = Ipv4Addr;
    const MAX_LENGTH: u8 = 32;
    const FAMILY: Family = Family::Ipv4;

    fn to_bits(addr: Ipv4Addr) -> u32 {
        u32::from(addr)
    }

    fn from_bits(bits: u32) -> Ipv4Addr {
        Ipv4Addr::from(bits)
    }
}

impl AddressFamily for V6 {
    type Bits = u128;
    type Addr = Ipv6Addr;
    const MAX_LENGTH: u8 = 128;
    const FAMILY: Family = Family::Ipv6;

    fn to_bits(addr: Ipv6Addr) -> u128 {
        u128::from(addr)
    }

    fn from_bits(bits: u128) -> Ipv6Addr {
        Ipv6Addr::from(bits)
    }
}

/// Runtime tag for an address family, used where the family comes from data or flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl Family {
    pub fn max_length(self) -> u8 {
        match self {
            Family::Ipv4 => V4::MAX_LENGTH,
            Family::Ipv6 => V6::MAX_LENGTH,
        }
    }

    /// Detect the family of a CIDR or bare address from its address part.
    ///
    /// ```
    /// use cloud_ip_lists::models::Family;
    /// assert_eq!(Family::detect("10.0.0.0/8"), Some(Family::Ipv4));
    /// assert_eq!(Family::detect("2001:db8::/32"), Some(Family::Ipv6));
    /// assert_eq!(Family::detect("example.com"), None);
    /// ```
    pub fn detect(entry: &str) -> Option<Family> {
        let addr = entry.trim().split('/').next().unwrap_or_default();
        match addr.parse::<IpAddr>().ok()? {
            IpAddr::V4(_) => Some(Family::Ipv4),
            IpAddr::V6(_) => Some(Family::Ipv6),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::Ipv4 => write!(f, "IPv4"),
            Family::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// Network mask with the top `len` bits set.
///
/// `len` must not exceed the family's [`AddressFamily::MAX_LENGTH`].
pub fn get_cidr_mask<F: AddressFamily>(len: u8) -> F::Bits {
    debug_assert!(len <= F::MAX_LENGTH, "prefix /{len} too long for {}", F::FAMILY);
    if len == 0 {
        F::Bits::ZERO
    } else {
        F::Bits::MAX << (F::Bits::BITS - u32::from(len))
    }
}

/// Host mask (the low `MAX_LENGTH - len` bits set), i.e. block size minus one.
pub fn host_mask<F: AddressFamily>(len: u8) -> F::Bits {
    !get_cidr_mask::<F>(len)
}

/// Network address for the given bits and prefix length.
pub fn cut_addr<F: AddressFamily>(bits: F::Bits, len: u8) -> F::Bits {
    bits & get_cidr_mask::<F>(len)
}

/// Highest address of the block starting at the network of `bits`.
pub fn broadcast_addr<F: AddressFamily>(bits: F::Bits, len: u8) -> F::Bits {
    cut_addr::<F>(bits, len) | host_mask::<F>(len)
}

/// Smallest prefix length for which `bits` is still a valid network address.
pub fn lo_mask<F: AddressFamily>(bits: F::Bits) -> u8 {
    let trailing_zeros = bits.trailing_zeros().min(u32::from(F::MAX_LENGTH));
    F::MAX_LENGTH - trailing_zeros as u8
}
