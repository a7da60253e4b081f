//! CIDR range parsing and address counting.
//!
//! Provides [`Cidr`] for IPv4 and IPv6 `address/prefix` ranges.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Maximum prefix length for an IPv4 range.
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 range.
pub const MAX_LENGTH_V6: u8 = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrError {
    #[error("invalid CIDR format: {0}")]
    Format(String),
    #[error("invalid IP address: {0}")]
    Address(String),
    #[error("invalid prefix length: {0}")]
    Prefix(String),
    #[error("host bits set in network range: {0}")]
    HostBits(String),
}

/// An IP range in CIDR notation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cidr {
    pub addr: IpAddr,
    pub prefix: u8,
}

impl Cidr {
    /// Parse a CIDR string such as `10.0.0.0/28`.
    pub fn parse(addr_cidr: &str) -> Result<Cidr, CidrError> {
        addr_cidr.parse()
    }

    /// Bit width of the address family.
    pub fn max_length(&self) -> u8 {
        match self.addr {
            IpAddr::V4(_) => MAX_LENGTH_V4,
            IpAddr::V6(_) => MAX_LENGTH_V6,
        }
    }

    /// Total number of addresses in the range, network and broadcast included.
    ///
    /// Saturates at `u128::MAX` for an IPv6 `/0`.
    pub fn address_count(&self) -> u128 {
        let host_bits = u32::from(self.max_length() - self.prefix);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }

    /// Whether the address has no bits set past the prefix.
    pub fn is_network_address(&self) -> bool {
        let bits = match self.addr {
            IpAddr::V4(v4) => u128::from(u32::from(v4)),
            IpAddr::V6(v6) => u128::from(v6),
        };
        let host_bits = u32::from(self.max_length() - self.prefix);
        let host_mask = 1u128
            .checked_shl(host_bits)
            .map_or(u128::MAX, |n| n - 1);
        bits & host_mask == 0
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| CidrError::Format(s.to_string()))?;

        let addr: IpAddr = addr
            .parse()
            .map_err(|_| CidrError::Address(addr.to_string()))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| CidrError::Prefix(prefix.to_string()))?;

        let cidr = Cidr { addr, prefix };
        if prefix > cidr.max_length() {
            return Err(CidrError::Prefix(prefix.to_string()));
        }
        if !cidr.is_network_address() {
            return Err(CidrError::HostBits(s.to_string()));
        }
        Ok(cidr)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}
