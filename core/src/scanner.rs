//! The scan orchestrator.
//!
//! [`Scanner::scan`] runs the per-host pipeline for every address with at
//! most `concurrency` hosts in flight. A permit is taken from a semaphore
//! before a host task is spawned and is released only once that task has
//! produced its [`ScanResult`], including the `on_alive` callback. The
//! callback therefore runs inside the bounded pool: a slow callback lowers the
//! effective concurrency, so it should hand work off (e.g. into a channel)
//! rather than do it.
//!
//! Cancellation stops new hosts from being launched; hosts already in flight
//! run to completion, bounded by their own timeouts. Either way the returned
//! report holds exactly one result per address, sorted numerically.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

use lanprobe_common::config::ScanConfig;
use lanprobe_common::network::host::ScanResult;
use lanprobe_common::network::vendor::VendorRepository;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::network::{self, NetworkOps};
use crate::neighbor::{self, NeighborTable};
use crate::{classify, enrich, probe, vendors};

/// Invoked for every live host the moment its result is ready.
pub type HostCallback = Arc<dyn Fn(&ScanResult) + Send + Sync>;

#[derive(Clone)]
pub struct Scanner {
    config: ScanConfig,
    ops: Arc<dyn NetworkOps>,
    neighbors: Arc<dyn NeighborTable>,
    vendors: Arc<dyn VendorRepository>,
    cancel: CancellationToken,
}

impl Scanner {
    /// A scanner wired to the real network of this platform.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            ops: network::default_ops(),
            neighbors: neighbor::platform_table(),
            vendors: vendors::default_repository(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_ops(mut self, ops: Arc<dyn NetworkOps>) -> Self {
        self.ops = ops;
        self
    }

    pub fn with_neighbors(mut self, neighbors: Arc<dyn NeighborTable>) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_vendors(mut self, vendors: Arc<dyn VendorRepository>) -> Self {
        self.vendors = vendors;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Scans `addresses` and returns one result per address, sorted by numeric value.
    pub async fn scan(&self, addresses: &[Ipv4Addr], on_alive: Option<HostCallback>) -> Vec<ScanResult> {
        let concurrency = self.config.concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks: JoinSet<ScanResult> = JoinSet::new();

        info!(
            "scanning {} addresses, {} at a time, timeout {:?}",
            addresses.len(),
            concurrency,
            self.config.timeout
        );

        for (launched, &addr) in addresses.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("scan cancelled, {} addresses not probed", addresses.len() - launched);
                    break;
                }
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let scanner = self.clone();
            let callback = on_alive.clone();
            tasks.spawn(async move {
                let result = scanner.inspect(addr).await;
                if result.alive {
                    if let Some(callback) = &callback {
                        callback(&result);
                    }
                }
                drop(permit);
                result
            });
        }

        let mut results: Vec<ScanResult> = Vec::with_capacity(addresses.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!("host task failed: {e}"),
            }
        }

        let seen: HashSet<Ipv4Addr> = results.iter().map(|r| r.address).collect();
        for &addr in addresses {
            if !seen.contains(&addr) {
                results.push(ScanResult::unreachable(addr));
            }
        }

        results.sort_by_key(|r| u32::from(r.address));
        info!(
            "scan finished: {} of {} hosts alive",
            results.iter().filter(|r| r.alive).count(),
            results.len()
        );
        results
    }

    /// Runs the whole pipeline for one address. Failures along the way only
    /// leave fields empty.
    pub async fn inspect(&self, addr: Ipv4Addr) -> ScanResult {
        let ops: &dyn NetworkOps = self.ops.as_ref();
        let timeout = self.config.timeout;

        let method = probe::probe(ops, addr, self.config.effective_ports(), timeout).await;
        let alive = method.is_alive();

        let mac = neighbor::resolve(ops, self.neighbors.as_ref(), addr, timeout).await;

        let ptr = if self.config.reverse_dns {
            ops.reverse_lookup(addr, timeout).await
        } else {
            None
        };
        let name = enrich::enrich(ops, addr, timeout, ptr).await;

        let vendor = mac.and_then(|mac| self.vendors.get_vendor(mac));
        let class = classify::classify(ops, addr, timeout, vendor.as_deref(), name.as_deref()).await;
        let (device_class, reverse_name) = classify::mobile_fallback(alive, class, mac, name);

        debug!("{addr}: alive={alive} method={} vendor={vendor:?} class={device_class}", method.as_str());

        ScanResult {
            address: addr,
            alive,
            method,
            mac,
            reverse_name,
            device_class,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
