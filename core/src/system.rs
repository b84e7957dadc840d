//! Facts about the machine running the probe, as announced by the agent.

use std::net::Ipv4Addr;
use std::thread;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use pnet::util::MacAddr;
use sysinfo::{System, SystemExt};
use tracing::debug;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFacts {
    pub agent_id: String,
    pub subnet: String,
    pub cpu_cores: usize,
    pub ram_mb: u64,
}

impl AgentFacts {
    pub fn collect() -> Self {
        let interfaces = datalink::interfaces();

        let mut sys = System::new();
        sys.refresh_memory();
        let ram_mb = sys.total_memory() / (1024 * 1024);

        let cpu_cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

        let facts = Self {
            agent_id: agent_id(&interfaces),
            subnet: subnet_octet(&interfaces),
            cpu_cores,
            ram_mb,
        };
        debug!("agent facts: {facts:?}");
        facts
    }
}

/// MAC of the first interface that is up and has a hardware address.
pub fn agent_id(interfaces: &[NetworkInterface]) -> String {
    interfaces
        .iter()
        .filter(|iface| iface.is_up())
        .find_map(|iface| iface.mac.filter(|mac| *mac != MacAddr::zero()))
        .map(|mac| mac.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// First IPv4 address that is neither loopback nor link-local.
pub fn primary_ipv4(interfaces: &[NetworkInterface]) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .flat_map(|iface| iface.ips.iter())
        .filter_map(|net| match net {
            IpNetwork::V4(v4) => Some(v4.ip()),
            IpNetwork::V6(_) => None,
        })
        .find(|ip| !ip.is_loopback() && !ip.is_link_local())
}

/// Third octet of [`primary_ipv4`], the `N` in `192.168.N.x`.
pub fn subnet_octet(interfaces: &[NetworkInterface]) -> String {
    primary_ipv4(interfaces)
        .map(|ip| ip.octets()[2].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
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
    use pnet::ipnetwork::Ipv4Network;

    const UP: u32 = 1;

    fn iface(name: &str, mac: Option<MacAddr>, ip: Ipv4Addr, flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.into(),
            description: "".to_string(),
            index: 1,
            mac,
            ips: vec![IpNetwork::V4(Ipv4Network::new(ip, 24).unwrap())],
            flags,
        }
    }

    #[test]
    fn agent_id_skips_down_and_zero_macs() {
        let lo = iface("lo", Some(MacAddr::zero()), Ipv4Addr::LOCALHOST, UP);
        let down = iface("eth1", Some(MacAddr::new(1, 2, 3, 4, 5, 6)), Ipv4Addr::new(10, 0, 0, 2), 0);
        let eth = iface("eth0", Some(MacAddr::new(0xaa, 0xbb, 0xcc, 0, 0, 1)), Ipv4Addr::new(10, 0, 0, 3), UP);

        assert_eq!(agent_id(&[lo, down, eth]), "aa:bb:cc:00:00:01");
    }

    #[test]
    fn agent_id_unknown_without_hardware() {
        let tun = iface("tun0", None, Ipv4Addr::new(10, 8, 0, 1), UP);
        assert_eq!(agent_id(&[tun]), "unknown");
        assert_eq!(agent_id(&[]), "unknown");
    }

    #[test]
    fn subnet_comes_from_first_routable_ipv4() {
        let lo = iface("lo", None, Ipv4Addr::LOCALHOST, UP);
        let ll = iface("eth1", None, Ipv4Addr::new(169, 254, 3, 7), UP);
        let lan = iface("eth0", None, Ipv4Addr::new(192, 168, 42, 10), UP);

        assert_eq!(primary_ipv4(&[lo.clone(), ll.clone(), lan.clone()]), Some(Ipv4Addr::new(192, 168, 42, 10)));
        assert_eq!(subnet_octet(&[lo.clone(), ll, lan]), "42");
        assert_eq!(subnet_octet(&[lo]), "unknown");
    }

    #[test]
    fn collect_reports_some_resources() {
        let facts = AgentFacts::collect();
        assert!(facts.cpu_cores >= 1);
        assert!(!facts.agent_id.is_empty());
    }
}
