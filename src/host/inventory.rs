use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Addresses configured on a single network interface, in the order the
/// OS reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub inet: Vec<Ipv4Addr>,
    pub inet6: Vec<Ipv6Addr>,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_addr(mut self, addr: IpAddr) -> Self {
        self.push(addr);
        self
    }

    fn push(&mut self, addr: IpAddr) {
        match addr {
            IpAddr::V4(v4) => self.inet.push(v4),
            IpAddr::V6(v6) => self.inet6.push(v6),
        }
    }
}

/// Local network and identity facts about the host this agent runs on.
pub trait HostInventory: Send + Sync {
    fn interfaces(&self) -> &[Interface];

    /// Agent identifier, substituted for `%M`
    fn agent_id(&self) -> &str;

    /// Host grain, substituted for `%H`
    fn host(&self) -> &str;

    fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces().iter().find(|iface| iface.name == name)
    }

    /// Non-loopback IPv4 addresses across all interfaces
    fn ipv4_addrs(&self) -> Vec<Ipv4Addr> {
        self.interfaces()
            .iter()
            .flat_map(|iface| iface.inet.iter().copied())
            .filter(|addr| !addr.is_loopback())
            .collect()
    }

    /// Non-loopback IPv6 addresses across all interfaces
    fn ipv6_addrs(&self) -> Vec<Ipv6Addr> {
        self.interfaces()
            .iter()
            .flat_map(|iface| iface.inet6.iter().copied())
            .filter(|addr| !addr.is_loopback())
            .collect()
    }
}

/// A fixed view of the host, either discovered once from the OS or built
/// explicitly.
#[derive(Debug, Clone, Default)]
pub struct HostSnapshot {
    agent_id: String,
    host: String,
    interfaces: Vec<Interface>,
}

impl HostSnapshot {
    pub fn new(
        agent_id: impl Into<String>,
        host: impl Into<String>,
        interfaces: Vec<Interface>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            host: host.into(),
            interfaces,
        }
    }

    /// Build a snapshot from a flat `(interface, address)` listing, merging
    /// repeated interface names in first-seen order.
    pub fn from_addresses(
        agent_id: impl Into<String>,
        host: impl Into<String>,
        addresses: impl IntoIterator<Item = (String, IpAddr)>,
    ) -> Self {
        let mut interfaces: Vec<Interface> = Vec::new();
        for (name, addr) in addresses {
            match interfaces.iter_mut().find(|iface| iface.name == name) {
                Some(iface) => iface.push(addr),
                None => interfaces.push(Interface::new(name).with_addr(addr)),
            }
        }
        Self::new(agent_id, host, interfaces)
    }
}

impl HostInventory for HostSnapshot {
    fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_addresses_groups_by_interface() {
        let snapshot = HostSnapshot::from_addresses(
            "web1.example.com",
            "web1",
            vec![
                ("lo".to_string(), ip("127.0.0.1")),
                ("eth0".to_string(), ip("10.1.2.3")),
                ("lo".to_string(), ip("::1")),
                ("eth0".to_string(), ip("2001:db8::3")),
                ("eth0".to_string(), ip("10.1.2.4")),
            ],
        );

        let names: Vec<_> = snapshot.interfaces().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["lo", "eth0"]);

        let eth0 = snapshot.interface("eth0").unwrap();
        assert_eq!(eth0.inet, vec![Ipv4Addr::new(10, 1, 2, 3), Ipv4Addr::new(10, 1, 2, 4)]);
        assert_eq!(eth0.inet6, vec!["2001:db8::3".parse::<Ipv6Addr>().unwrap()]);
        assert!(snapshot.interface("wlan0").is_none());
    }

    #[test]
    fn test_address_lists_skip_loopback() {
        let snapshot = HostSnapshot::new(
            "id",
            "host",
            vec![
                Interface::new("lo")
                    .with_addr(ip("127.0.0.1"))
                    .with_addr(ip("::1")),
                Interface::new("eth0")
                    .with_addr(ip("192.168.1.10"))
                    .with_addr(ip("fe80::1")),
            ],
        );

        assert_eq!(snapshot.ipv4_addrs(), vec![Ipv4Addr::new(192, 168, 1, 10)]);
        assert_eq!(snapshot.ipv6_addrs(), vec!["fe80::1".parse::<Ipv6Addr>().unwrap()]);
    }
}
