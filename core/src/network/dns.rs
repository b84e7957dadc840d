use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tokio::time::timeout;
use tracing::trace;

/// Reverse DNS through the system resolver, bounded by `limit`.
///
/// The blocking lookup runs on the blocking pool; when the deadline passes the
/// answer is abandoned rather than awaited.
pub async fn reverse_lookup(addr: Ipv4Addr, limit: Duration) -> Option<String> {
    let ip = IpAddr::V4(addr);
    let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip));

    match timeout(limit, lookup).await {
        Ok(Ok(Ok(name))) => clean_name(&name, addr),
        Ok(Ok(Err(e))) => {
            trace!("no PTR for {addr}: {e}");
            None
        }
        _ => None,
    }
}

/// Drops the root dot and rejects answers that merely echo the address.
fn clean_name(name: &str, addr: Ipv4Addr) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || name == addr.to_string() {
        return None;
    }
    Some(name.to_string())
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
    fn trailing_dot_is_removed() {
        let addr = Ipv4Addr::new(192, 168, 1, 5);
        assert_eq!(clean_name("nas.lan.", addr).as_deref(), Some("nas.lan"));
    }

    #[test]
    fn numeric_echo_is_not_a_name() {
        let addr = Ipv4Addr::new(192, 168, 1, 5);
        assert_eq!(clean_name("192.168.1.5", addr), None);
        assert_eq!(clean_name(".", addr), None);
    }

    #[tokio::test]
    #[ignore]
    async fn public_resolver_has_ptr() {
        let name = reverse_lookup(Ipv4Addr::new(1, 1, 1, 1), Duration::from_secs(3)).await;
        assert_eq!(name.as_deref(), Some("one.one.one.one"));
    }
}
