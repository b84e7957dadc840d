use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

/// An inclusive, ascending span of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    /// Builds a range from two endpoints, swapping them when given in reverse.
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        if u32::from(start_addr) > u32::from(end_addr) {
            return Self {
                start_addr: end_addr,
                end_addr: start_addr,
            };
        }
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn host_count(&self) -> u64 {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        u64::from(end - start) + 1
    }

    pub fn to_iter(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start: u32 = self.start_addr.into();
        let end: u32 = self.end_addr.into();
        (start..=end).map(Ipv4Addr::from)
    }
}

/// Every address of the block `ip/prefix`, network and broadcast included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    let start = network.network();
    let end = network.broadcast();

    Ok(Ipv4Range::new(start, end))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_endpoints_are_swapped() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 9), Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(range.start_addr, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(range.host_count(), 8);
    }

    #[test]
    fn cidr_keeps_network_and_broadcast() {
        let range = cidr_range(Ipv4Addr::new(192, 168, 1, 77), 30).unwrap();
        let ips: Vec<Ipv4Addr> = range.to_iter().collect();
        assert_eq!(
            ips,
            vec![
                Ipv4Addr::new(192, 168, 1, 76),
                Ipv4Addr::new(192, 168, 1, 77),
                Ipv4Addr::new(192, 168, 1, 78),
                Ipv4Addr::new(192, 168, 1, 79),
            ]
        );
    }

    #[test]
    fn slash_32_is_a_single_host() {
        let range = cidr_range(Ipv4Addr::new(8, 8, 4, 4), 32).unwrap();
        assert_eq!(range.host_count(), 1);
        assert_eq!(range.start_addr, Ipv4Addr::new(8, 8, 4, 4));
    }

    #[test]
    fn prefix_above_32_is_rejected() {
        assert!(cidr_range(Ipv4Addr::new(10, 0, 0, 0), 33).is_err());
    }
}
