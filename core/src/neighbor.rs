//! MAC address resolution through the operating system's neighbor cache.
//!
//! The cache is shared with everything else on the machine and is only ever
//! nudged, never owned: a lookup first provokes some traffic toward the host
//! so that the kernel resolves it, then reads the table back. Each platform
//! reads the table differently, so that part sits behind [`NeighborTable`]
//! and the right implementation is picked once by [`platform_table`].

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lanprobe_protocols::arp;
use pnet::util::MacAddr;
use tracing::trace;

use crate::network::NetworkOps;
use crate::network::command;

/// Ports hit to make the kernel ARP for a host that ignores ICMP.
pub const PRIMING_PORTS: [u16; 3] = [80, 22, 443];

#[async_trait]
pub trait NeighborTable: Send + Sync {
    /// Reads the cached hardware address of `addr`, if any.
    async fn lookup(&self, addr: Ipv4Addr, timeout: Duration) -> Option<MacAddr>;

    /// Last-resort priming when neither ICMP nor TCP got a response.
    async fn nudge(&self, _addr: Ipv4Addr, _timeout: Duration) {}
}

/// `ip neigh`, `/proc/net/arp`, then `arp -n`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxNeighbors;

#[async_trait]
impl NeighborTable for LinuxNeighbors {
    async fn lookup(&self, addr: Ipv4Addr, timeout: Duration) -> Option<MacAddr> {
        let target = addr.to_string();

        let from_ip_neigh = command::capture("ip", &["neigh", "show", target.as_str()], timeout)
            .await
            .and_then(|out| arp::parse_ip_neigh(&out));
        if from_ip_neigh.is_some() {
            return from_ip_neigh;
        }

        let from_proc = tokio::fs::read_to_string("/proc/net/arp")
            .await
            .ok()
            .and_then(|table| arp::parse_proc_net_arp(&table, addr));
        if from_proc.is_some() {
            return from_proc;
        }

        let attempts: [&[&str]; 2] = [&["-n", target.as_str()], &["-n"]];
        utility_lookup("arp", addr, &attempts, timeout).await
    }

    async fn nudge(&self, addr: Ipv4Addr, timeout: Duration) {
        let secs = timeout.as_secs().max(1).to_string();
        let target = addr.to_string();
        let replied = command::succeeds("arping", &["-c", "1", "-w", &secs, &target], timeout).await;
        trace!("arping {addr}: {replied}");
    }
}

/// macOS and the BSDs: `arp -n <addr>`, then the whole table.
#[derive(Debug, Default, Clone, Copy)]
pub struct BsdNeighbors;

#[async_trait]
impl NeighborTable for BsdNeighbors {
    async fn lookup(&self, addr: Ipv4Addr, timeout: Duration) -> Option<MacAddr> {
        let target = addr.to_string();
        let attempts: [&[&str]; 2] = [&["-n", target.as_str()], &["-an"]];
        utility_lookup("arp", addr, &attempts, timeout).await
    }
}

/// `arp -a`, which prints dash separated addresses.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsNeighbors;

#[async_trait]
impl NeighborTable for WindowsNeighbors {
    async fn lookup(&self, addr: Ipv4Addr, timeout: Duration) -> Option<MacAddr> {
        let target = addr.to_string();
        let attempts: [&[&str]; 2] = [&["-a", target.as_str()], &["-a"]];
        utility_lookup("arp", addr, &attempts, timeout).await
    }
}

/// Runs `program` with each argument set in turn until one output holds a
/// hardware address. A per-host query that only shows `(incomplete)` falls
/// through to the next set.
async fn utility_lookup(
    program: &str,
    addr: Ipv4Addr,
    attempts: &[&[&str]],
    timeout: Duration,
) -> Option<MacAddr> {
    for args in attempts {
        let Some(out) = command::capture(program, args, timeout).await else {
            continue;
        };
        if let Some(mac) = arp::parse_arp_output(&out, addr) {
            return Some(mac);
        }
        trace!("{program} {args:?}: no address for {addr}");
    }
    None
}

#[cfg(target_os = "linux")]
pub fn platform_table() -> Arc<dyn NeighborTable> {
    Arc::new(LinuxNeighbors)
}

#[cfg(target_os = "windows")]
pub fn platform_table() -> Arc<dyn NeighborTable> {
    Arc::new(WindowsNeighbors)
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn platform_table() -> Arc<dyn NeighborTable> {
    Arc::new(BsdNeighbors)
}

/// Provokes traffic toward `addr` so the kernel resolves it. Stops at the
/// first sign of life; the outcome itself is irrelevant.
pub async fn prime(ops: &dyn NetworkOps, table: &dyn NeighborTable, addr: Ipv4Addr, timeout: Duration) {
    if ops.ping(addr, timeout).await {
        return;
    }
    for port in PRIMING_PORTS {
        if ops.tcp_connect(addr, port, timeout / 2).await {
            return;
        }
    }
    table.nudge(addr, timeout).await;
}

/// Primes the cache and reads the hardware address of `addr` back.
pub async fn resolve(
    ops: &dyn NetworkOps,
    table: &dyn NeighborTable,
    addr: Ipv4Addr,
    timeout: Duration,
) -> Option<MacAddr> {
    prime(ops, table, addr, timeout).await;
    let mac = table.lookup(addr, timeout).await;
    trace!("{addr} resolved to {mac:?}");
    mac
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
