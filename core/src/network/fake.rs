use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lanprobe_protocols::http::HttpHints;

use super::NetworkOps;

/// Scripted network: answers only what it was told to, and records what was asked.
#[derive(Default)]
pub(crate) struct FakeOps {
    icmp: HashSet<Ipv4Addr>,
    open: HashSet<(Ipv4Addr, u16)>,
    banners: HashMap<(Ipv4Addr, u16), String>,
    http: HashMap<(Ipv4Addr, u16), HttpHints>,
    ptr: HashMap<Ipv4Addr, String>,
    delay: Duration,
    connects: Mutex<Vec<(Ipv4Addr, u16)>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn icmp(mut self, addr: Ipv4Addr) -> Self {
        self.icmp.insert(addr);
        self
    }

    pub fn open(mut self, addr: Ipv4Addr, port: u16) -> Self {
        self.open.insert((addr, port));
        self
    }

    pub fn banner(mut self, addr: Ipv4Addr, port: u16, text: &str) -> Self {
        self.open.insert((addr, port));
        self.banners.insert((addr, port), text.to_string());
        self
    }

    pub fn http(mut self, addr: Ipv4Addr, port: u16, server: Option<&str>, title: Option<&str>) -> Self {
        self.open.insert((addr, port));
        self.http.insert(
            (addr, port),
            HttpHints {
                server: server.map(str::to_string),
                title: title.map(str::to_string),
            },
        );
        self
    }

    pub fn ptr(mut self, addr: Ipv4Addr, name: &str) -> Self {
        self.ptr.insert(addr, name.to_string());
        self
    }

    /// Makes every ping take `delay`, so overlapping tasks become observable.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn connects_to(&self, addr: Ipv4Addr) -> Vec<u16> {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, port)| *port)
            .collect()
    }

    /// Highest number of pings that were in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Pings in flight right now.
    pub fn in_flight(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkOps for FakeOps {
    async fn ping(&self, addr: Ipv4Addr, _timeout: Duration) -> bool {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.icmp.contains(&addr)
    }

    async fn tcp_connect(&self, addr: Ipv4Addr, port: u16, _timeout: Duration) -> bool {
        self.connects.lock().unwrap().push((addr, port));
        self.open.contains(&(addr, port))
    }

    async fn read_banner(&self, addr: Ipv4Addr, port: u16, _timeout: Duration) -> Option<String> {
        self.banners.get(&(addr, port)).cloned()
    }

    async fn http_hints(&self, addr: Ipv4Addr, port: u16, _timeout: Duration) -> Option<HttpHints> {
        self.http.get(&(addr, port)).cloned()
    }

    async fn reverse_lookup(&self, addr: Ipv4Addr, _timeout: Duration) -> Option<String> {
        self.ptr.get(&addr).cloned()
    }
}
