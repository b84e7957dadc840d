use std::net::Ipv4Addr;
use std::time::Duration;

use lanprobe_protocols::banner;
use tracing::debug;

use crate::network::NetworkOps;

/// Ports whose greeting is read when nothing better named the host, in order.
pub const BANNER_PORTS: [u16; 5] = [554, 22, 80, 8080, 8000];

/// Finds a name for a host that has none.
///
/// A known name is returned untouched. Otherwise the web page on port 80 is
/// asked for its title or `Server` header, and failing that the first banner
/// any of [`BANNER_PORTS`] volunteers is mined for a device string.
/// Secondary probes each get half of `timeout`.
pub async fn enrich(
    ops: &dyn NetworkOps,
    addr: Ipv4Addr,
    timeout: Duration,
    existing: Option<String>,
) -> Option<String> {
    if existing.as_deref().is_some_and(|name| !name.is_empty()) {
        return existing;
    }
    let half = timeout / 2;

    if ops.tcp_connect(addr, 80, half).await {
        let hints = ops.http_hints(addr, 80, half).await;
        if let Some(name) = hints.as_ref().and_then(|h| h.display_name()) {
            debug!("{addr} named by its web page: {name}");
            return Some(name.to_string());
        }
    }

    for port in BANNER_PORTS {
        if !ops.tcp_connect(addr, port, half).await {
            continue;
        }
        let hint = ops
            .read_banner(addr, port, half)
            .await
            .and_then(|text| banner::name_hint(&text));
        if hint.is_some() {
            debug!("{addr} named by its TCP/{port} banner");
            return hint;
        }
    }

    None
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
