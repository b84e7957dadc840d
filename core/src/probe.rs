use std::net::Ipv4Addr;
use std::time::Duration;

use lanprobe_common::network::host::ProbeMethod;
use tracing::debug;

use crate::network::NetworkOps;

/// Decides whether `addr` is up: one ICMP echo, then TCP connects to `ports`
/// in the given order until one completes. Every attempt is bounded by `timeout`.
pub async fn probe(ops: &dyn NetworkOps, addr: Ipv4Addr, ports: &[u16], timeout: Duration) -> ProbeMethod {
    if ops.ping(addr, timeout).await {
        debug!("{addr} answered ICMP");
        return ProbeMethod::Icmp;
    }

    for &port in ports {
        if ops.tcp_connect(addr, port, timeout).await {
            debug!("{addr} accepted TCP/{port}");
            return ProbeMethod::Tcp(port);
        }
    }

    ProbeMethod::None
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
    use crate::network::fake::FakeOps;

    const HOST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);
    const TIMEOUT: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn icmp_wins_without_touching_tcp() {
        let ops = FakeOps::new().icmp(HOST).open(HOST, 22);
        assert_eq!(probe(&ops, HOST, &[22, 80], TIMEOUT).await, ProbeMethod::Icmp);
        assert!(ops.connects_to(HOST).is_empty());
    }

    #[tokio::test]
    async fn second_port_is_reported_when_first_is_closed() {
        let ops = FakeOps::new().open(HOST, 80);
        assert_eq!(probe(&ops, HOST, &[22, 80, 443], TIMEOUT).await, ProbeMethod::Tcp(80));
        assert_eq!(ops.connects_to(HOST), vec![22, 80]);
    }

    #[tokio::test]
    async fn ports_are_tried_in_list_order() {
        let ops = FakeOps::new().open(HOST, 22).open(HOST, 443);
        assert_eq!(probe(&ops, HOST, &[443, 22], TIMEOUT).await, ProbeMethod::Tcp(443));
    }

    #[tokio::test]
    async fn silent_host_is_down() {
        let ops = FakeOps::new();
        assert_eq!(probe(&ops, HOST, &[22, 80, 443], TIMEOUT).await, ProbeMethod::None);
        assert_eq!(ops.connects_to(HOST), vec![22, 80, 443]);
    }
}
