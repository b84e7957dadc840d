//! Primitive network operations the scan pipeline is built from.
//!
//! Everything that touches the wire goes through [`NetworkOps`] so that the
//! pipeline can run against fakes in tests. Two real implementations exist:
//! [`SystemOps`] shells out to the platform `ping`, while [`RawSocketOps`]
//! sends ICMP echo requests itself and therefore needs root.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lanprobe_protocols::http::HttpHints;
use tracing::debug;

pub mod command;
pub mod dns;
#[cfg(test)]
pub(crate) mod fake;
pub mod http;
pub mod icmp;
pub mod tcp;

#[async_trait]
pub trait NetworkOps: Send + Sync {
    /// One ICMP echo; `true` if a reply arrived within `timeout`.
    async fn ping(&self, addr: Ipv4Addr, timeout: Duration) -> bool;

    /// `true` if a TCP handshake with `addr:port` completes within `timeout`.
    async fn tcp_connect(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> bool {
        tcp::connect(addr, port, timeout).await
    }

    /// Whatever the service sends first, if anything.
    async fn read_banner(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> Option<String> {
        tcp::read_banner(addr, port, timeout).await
    }

    /// `Server` header and page title of `http://addr:port/`.
    async fn http_hints(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> Option<HttpHints> {
        http::fetch_hints(addr, port, timeout).await
    }

    /// The PTR name of `addr`.
    async fn reverse_lookup(&self, addr: Ipv4Addr, timeout: Duration) -> Option<String> {
        dns::reverse_lookup(addr, timeout).await
    }
}

/// Uses the operating system's `ping` binary. Works unprivileged everywhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOps;

#[async_trait]
impl NetworkOps for SystemOps {
    async fn ping(&self, addr: Ipv4Addr, timeout: Duration) -> bool {
        icmp::system_ping(addr, timeout).await
    }
}

/// Crafts ICMP echo requests on a raw socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawSocketOps;

#[async_trait]
impl NetworkOps for RawSocketOps {
    async fn ping(&self, addr: Ipv4Addr, timeout: Duration) -> bool {
        match icmp::raw_ping(addr, timeout).await {
            Ok(replied) => replied,
            Err(e) => {
                debug!("raw ICMP to {addr} failed, falling back to ping: {e}");
                icmp::system_ping(addr, timeout).await
            }
        }
    }
}

/// Raw sockets when running as root, the `ping` binary otherwise.
pub fn default_ops() -> Arc<dyn NetworkOps> {
    if is_root::is_root() {
        debug!("running privileged, using raw ICMP sockets");
        Arc::new(RawSocketOps)
    } else {
        Arc::new(SystemOps)
    }
}
