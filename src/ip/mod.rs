mod cidr;

pub use cidr::{Cidr, CidrError};

use std::fmt;
use std::net::IpAddr;

use tracing::debug;

use crate::host::HostInventory;

/// Where the address for a record comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpSource {
    /// First address of the record's family on this interface
    Iface(String),
    /// First local address inside this network
    Cidr(String),
}

impl IpSource {
    /// Accept exactly one of `iface` or `cidr`.
    pub fn from_options(iface: Option<&str>, cidr: Option<&str>) -> Option<Self> {
        match (iface, cidr) {
            (Some(iface), None) => Some(IpSource::Iface(iface.to_string())),
            (None, Some(cidr)) => Some(IpSource::Cidr(cidr.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for IpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpSource::Iface(iface) => write!(f, "iface={}", iface),
            IpSource::Cidr(cidr) => write!(f, "cidr={}", cidr),
        }
    }
}

pub fn resolve(
    inventory: &dyn HostInventory,
    source: &IpSource,
    record_type: &str,
) -> Option<IpAddr> {
    let resolved = match source {
        IpSource::Iface(iface) => resolve_by_iface(inventory, iface, record_type),
        IpSource::Cidr(cidr) => resolve_by_cidr(inventory, cidr),
    };
    debug!("Resolved {} to {:?}", source, resolved);
    resolved
}

/// Return the first local address of the network's family contained in
/// `cidr`. A malformed network yields `None`.
pub fn resolve_by_cidr(inventory: &dyn HostInventory, cidr: &str) -> Option<IpAddr> {
    let subnet: Cidr = match cidr.parse() {
        Ok(subnet) => subnet,
        Err(e) => {
            debug!("Ignoring CIDR {}: {}", cidr, e);
            return None;
        }
    };

    let candidates: Vec<IpAddr> = if subnet.is_ipv4() {
        inventory.ipv4_addrs().into_iter().map(IpAddr::V4).collect()
    } else {
        inventory.ipv6_addrs().into_iter().map(IpAddr::V6).collect()
    };

    candidates.into_iter().find(|addr| subnet.contains(addr))
}

/// Return the first address on `iface` of the family matching
/// `record_type` (`A` for IPv4, `AAAA` for IPv6).
pub fn resolve_by_iface(
    inventory: &dyn HostInventory,
    iface: &str,
    record_type: &str,
) -> Option<IpAddr> {
    let interface = inventory.interface(iface)?;

    match record_type {
        "A" => interface.inet.first().copied().map(IpAddr::V4),
        "AAAA" => interface.inet6.first().copied().map(IpAddr::V6),
        _ => None,
    }
}
