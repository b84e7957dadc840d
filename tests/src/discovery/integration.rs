use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lanprobe_common::config::ScanConfig;
use lanprobe_common::network::host::{ProbeMethod, ScanResult};
use lanprobe_common::network::target::{self, TargetError};
use lanprobe_common::network::vendor::StaticVendors;
use lanprobe_core::neighbor::NeighborTable;
use lanprobe_core::network::NetworkOps;
use lanprobe_core::scanner::{HostCallback, Scanner};
use pnet::util::MacAddr;
use tokio::net::TcpListener;

const LOCALHOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

/// Real TCP, but ICMP never answers, so liveness has to come from a port.
struct TcpOnlyOps;

#[async_trait]
impl NetworkOps for TcpOnlyOps {
    async fn ping(&self, _addr: Ipv4Addr, _timeout: Duration) -> bool {
        false
    }
}

struct NoNeighbors;

#[async_trait]
impl NeighborTable for NoNeighbors {
    async fn lookup(&self, _addr: Ipv4Addr, _timeout: Duration) -> Option<MacAddr> {
        None
    }
}

fn scanner(ports: Vec<u16>) -> Scanner {
    let config = ScanConfig {
        ports,
        timeout: Duration::from_millis(300),
        concurrency: 4,
        reverse_dns: false,
    };
    Scanner::new(config)
        .with_ops(Arc::new(TcpOnlyOps))
        .with_neighbors(Arc::new(NoNeighbors))
        .with_vendors(Arc::new(StaticVendors))
}

/// A loopback listener accepting and dropping connections in the background.
async fn listener() -> u16 {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    port
}

/// A port nothing listens on, as far as one can tell.
fn closed_port() -> u16 {
    let probe = std::net::TcpListener::bind((LOCALHOST, 0)).unwrap();
    let port = probe.local_addr().unwrap().port();
    drop(probe);
    port
}

#[tokio::test]
async fn second_candidate_port_establishes_liveness() {
    let open = listener().await;
    let closed = closed_port();

    let results = scanner(vec![closed, open]).scan(&[LOCALHOST], None).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].alive);
    assert_eq!(results[0].method, ProbeMethod::Tcp(open));
}

#[tokio::test]
async fn loopback_range_yields_sorted_results() {
    let open = listener().await;
    let addresses = target::expand("127.0.0.3, 127.0.0.1-2").unwrap();
    assert_eq!(addresses.len(), 3);

    let results = scanner(vec![open]).scan(&addresses, None).await;

    let got: Vec<Ipv4Addr> = results.iter().map(|r| r.address).collect();
    assert_eq!(
        got,
        vec![
            Ipv4Addr::new(127, 0, 0, 1),
            Ipv4Addr::new(127, 0, 0, 2),
            Ipv4Addr::new(127, 0, 0, 3),
        ]
    );
    assert!(results[0].alive);
}

#[tokio::test]
async fn callback_reports_the_listening_host() {
    let open = listener().await;
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let callback: HostCallback = Arc::new(move |result: &ScanResult| {
        assert!(result.alive);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let results = scanner(vec![open]).scan(&[LOCALHOST], Some(callback)).await;

    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(results[0].method, ProbeMethod::Tcp(open));
}

#[tokio::test]
async fn rescanning_gives_the_same_answer() {
    let open = listener().await;
    let scanner = scanner(vec![open]);

    let first = scanner.scan(&[LOCALHOST], None).await;
    let second = scanner.scan(&[LOCALHOST], None).await;
    assert_eq!(first, second);
}

#[test]
fn malformed_target_never_reaches_the_scanner() {
    assert_eq!(
        target::expand("not-an-ip"),
        Err(TargetError::Unrecognized("not-an-ip".into()))
    );
}
