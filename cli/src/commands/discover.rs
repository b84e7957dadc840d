use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use colored::*;
use lanprobe_common::config::{self, Config, DEFAULT_CONCURRENCY, ScanConfig};
use lanprobe_common::network::host::ScanResult;
use lanprobe_common::network::target::AddressSpec;
use lanprobe_core::scanner::{HostCallback, Scanner};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

use crate::mprint;
use crate::report::{DeliveryStats, Reporter};
use crate::terminal::{colors, print, spinner};

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// ip, ip/prefix, ip-ip or ip-lastOctet; several may be comma separated
    pub target: AddressSpec,

    /// Comma separated TCP ports tried, in order, when ICMP gets no answer
    #[arg(long)]
    pub ports: Option<String>,

    /// Timeout of every network operation, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout: u64,

    /// Hosts probed at the same time
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Print the report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Skip reverse DNS lookups
    #[arg(long)]
    pub no_dns: bool,

    /// Inventory backend host; live hosts are forwarded as they are found
    #[arg(long, env = "LANPROBE_SERVER")]
    pub server: Option<String>,

    /// Backend request timeout, in seconds
    #[arg(long, default_value_t = 3)]
    pub backend_timeout: u64,

    /// Concurrent backend requests
    #[arg(long, default_value_t = 20)]
    pub backend_workers: usize,
}

impl DiscoverArgs {
    pub fn scan_config(&self, cfg: &Config) -> ScanConfig {
        let ports = match self.ports.as_deref() {
            Some(list) => config::parse_ports(list),
            None => config::DEFAULT_PORTS.to_vec(),
        };
        ScanConfig {
            ports,
            timeout: Duration::from_millis(self.timeout.max(1)),
            concurrency: self.concurrency.max(1),
            reverse_dns: !cfg.no_dns,
        }
    }
}

pub async fn discover(args: DiscoverArgs, cfg: &Config) -> anyhow::Result<()> {
    let addresses = args.target.addresses().to_vec();
    let scan_config = args.scan_config(cfg);
    info!(
        "target {} expands to {} addresses, {} candidate ports",
        args.target,
        addresses.len(),
        scan_config.ports.len()
    );

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing hosts already in flight");
            watcher.cancel();
        }
    });

    let reporter = args
        .server
        .as_deref()
        .map(|server| Reporter::new(server, Duration::from_secs(args.backend_timeout)))
        .transpose()?;
    let (queue, pool) = match &reporter {
        Some(reporter) => {
            info!("forwarding live hosts to {}", reporter.url());
            let (tx, handle) = reporter.spawn_pool(args.backend_workers, addresses.len());
            (Some(tx), Some(handle))
        }
        None => (None, None),
    };

    let span = spinner::scan_span(addresses.len());
    let found = Arc::new(AtomicUsize::new(0));
    let progress = span.clone();
    let counter = found.clone();
    let live = !cfg.quiet;
    let on_alive: HostCallback = Arc::new(move |result: &ScanResult| {
        let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
        spinner::report_progress(&progress, count);
        if live {
            print::host_found(result);
        }
        if let Some(tx) = &queue {
            if let Err(e) = tx.try_send(result.clone()) {
                warn!("dropping report for {}: {e}", result.address);
            }
        }
    });

    let scanner = Scanner::new(scan_config).with_cancellation(cancel);
    let start_time = Instant::now();
    let results = scanner.scan(&addresses, Some(on_alive)).instrument(span).await;
    let elapsed = start_time.elapsed();

    let stats = match pool {
        Some(handle) => Some(handle.await.context("backend delivery pool failed")?),
        None => None,
    };

    if cfg.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_report(&results);
    }
    print_summary(&results, elapsed, stats);
    Ok(())
}

fn print_report(results: &[ScanResult]) {
    mprint!();
    print::header("discovery report");
    if results.iter().all(|r| !r.alive) {
        print::no_results();
    }
    for result in results {
        print::result_line(result);
    }
}

fn print_summary(results: &[ScanResult], elapsed: Duration, stats: Option<DeliveryStats>) {
    let alive = results.iter().filter(|r| r.alive).count();
    let active: ColoredString = format!("{alive} of {}", results.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", elapsed.as_secs_f64()).bold().yellow();

    print::fat_separator();
    print::centerln(
        &format!("Discovery complete: {active} hosts alive in {total_time}")
            .color(colors::TEXT_DEFAULT)
            .to_string(),
    );
    if let Some(stats) = stats {
        print::aligned_line("Delivered", 9, stats.delivered);
        print::aligned_line("Failed", 9, stats.failed);
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
