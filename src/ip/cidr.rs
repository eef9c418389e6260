use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid network address: {0}")]
    Address(String),

    #[error("invalid prefix length: {0}")]
    Prefix(String),

    #[error("{0} has host bits set")]
    HostBits(String),
}

/// An IPv4 or IPv6 network in `address/prefix` notation.
///
/// Parsing is strict: the address must be the network address itself.
/// A bare address is read as a single-host network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cidr {
    V4 { network: Ipv4Addr, prefix: u8 },
    V6 { network: Ipv6Addr, prefix: u8 },
}

fn v4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn v6_mask(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}

impl Cidr {
    pub fn prefix(&self) -> u8 {
        match self {
            Cidr::V4 { prefix, .. } | Cidr::V6 { prefix, .. } => *prefix,
        }
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, Cidr::V4 { .. })
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (Cidr::V4 { network, prefix }, IpAddr::V4(addr)) => {
                u32::from(*addr) & v4_mask(*prefix) == u32::from(*network)
            }
            (Cidr::V6 { network, prefix }, IpAddr::V6(addr)) => {
                u128::from(*addr) & v6_mask(*prefix) == u128::from(*network)
            }
            _ => false,
        }
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_part, prefix_part) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| CidrError::Address(addr_part.to_string()))?;

        let max = if addr.is_ipv4() { 32 } else { 128 };
        let prefix = match prefix_part {
            Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()) => p
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= max)
                .ok_or_else(|| CidrError::Prefix(p.to_string()))?,
            Some(p) => return Err(CidrError::Prefix(p.to_string())),
            None => max,
        };

        let cidr = match addr {
            IpAddr::V4(network) => {
                if u32::from(network) & !v4_mask(prefix) != 0 {
                    return Err(CidrError::HostBits(s.to_string()));
                }
                Cidr::V4 { network, prefix }
            }
            IpAddr::V6(network) => {
                if u128::from(network) & !v6_mask(prefix) != 0 {
                    return Err(CidrError::HostBits(s.to_string()));
                }
                Cidr::V6 { network, prefix }
            }
        };

        Ok(cidr)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cidr::V4 { network, prefix } => write!(f, "{}/{}", network, prefix),
            Cidr::V6 { network, prefix } => write!(f, "{}/{}", network, prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_networks() {
        let net: Cidr = "10.0.0.0/8".parse().unwrap();
        assert!(net.is_ipv4());
        assert_eq!(net.prefix(), 8);
        assert_eq!(net.to_string(), "10.0.0.0/8");

        let net: Cidr = "2001:db8::/32".parse().unwrap();
        assert!(!net.is_ipv4());
        assert_eq!(net.to_string(), "2001:db8::/32");

        let host: Cidr = "192.0.2.7".parse().unwrap();
        assert_eq!(host.prefix(), 32);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("not-a-net".parse::<Cidr>(), Err(CidrError::Address(_))));
        assert!(matches!("10.0.0.0/33".parse::<Cidr>(), Err(CidrError::Prefix(_))));
        assert!(matches!("10.0.0.0/".parse::<Cidr>(), Err(CidrError::Prefix(_))));
        assert!(matches!("10.0.0.0/+8".parse::<Cidr>(), Err(CidrError::Prefix(_))));
        assert!(matches!("2001:db8::/129".parse::<Cidr>(), Err(CidrError::Prefix(_))));
        assert!(matches!("10.0.0.1/8".parse::<Cidr>(), Err(CidrError::HostBits(_))));
    }

    #[test]
    fn test_contains() {
        let net: Cidr = "10.0.0.0/8".parse().unwrap();
        assert!(net.contains(&ip("10.200.3.4")));
        assert!(!net.contains(&ip("11.0.0.1")));
        assert!(!net.contains(&ip("::ffff:10.0.0.1")));

        let all: Cidr = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains(&ip("203.0.113.5")));

        let v6: Cidr = "2001:db8:1::/48".parse().unwrap();
        assert!(v6.contains(&ip("2001:db8:1:ff::1")));
        assert!(!v6.contains(&ip("2001:db8:2::1")));
    }
}
