//! Forwarding of live hosts to the inventory backend.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use lanprobe_common::network::host::{DeviceClass, ScanResult};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, warn};

pub const BACKEND_PORT: u16 = 3000;
pub const REPORT_PATH: &str = "/dispositivos/found";

/// The record the backend expects for every host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDto {
    pub ip: String,
    pub alive: String,
    pub via: String,
    pub device: String,
    pub mac: String,
    pub name: String,
}

impl From<&ScanResult> for ReportDto {
    fn from(result: &ScanResult) -> Self {
        let device = match result.device_class {
            DeviceClass::Unknown => "Unknown".to_string(),
            class => class.as_str().to_string(),
        };
        Self {
            ip: result.address.to_string(),
            alive: if result.alive { "sí" } else { "no" }.to_string(),
            via: result.method.as_str().to_string(),
            device,
            mac: result.mac_string().unwrap_or_default(),
            name: result.reverse_name.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("POST to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("backend rejected {ip} with {status}: {body}")]
    Rejected {
        ip: String,
        status: StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Reporter {
    client: Client,
    url: Arc<str>,
}

impl Reporter {
    /// Reporter for the backend running on `server`.
    pub fn new(server: &str, timeout: Duration) -> anyhow::Result<Self> {
        Self::with_url(&format!("http://{server}:{BACKEND_PORT}{REPORT_PATH}"), timeout)
    }

    pub fn with_url(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("failed to build the backend HTTP client")?;
        Ok(Self {
            client,
            url: Arc::from(url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts one result. Only `200` and `201` count as delivered.
    pub async fn send(&self, result: &ScanResult) -> Result<(), ReportError> {
        let dto = ReportDto::from(result);
        let response = self
            .client
            .post(self.url.as_ref())
            .json(&dto)
            .send()
            .await
            .map_err(|source| ReportError::Transport {
                url: self.url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            debug!("reported {} to the backend", dto.ip);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ReportError::Rejected {
            ip: dto.ip,
            status,
            body,
        })
    }

    /// Starts a delivery pool of `workers` concurrent requests fed through a
    /// queue holding up to `capacity` results. The handle resolves once the
    /// sender side is dropped and every queued result has been attempted.
    pub fn spawn_pool(
        &self,
        workers: usize,
        capacity: usize,
    ) -> (mpsc::Sender<ScanResult>, JoinHandle<DeliveryStats>) {
        let (tx, mut rx) = mpsc::channel::<ScanResult>(capacity.max(1));
        let reporter = self.clone();

        let handle = tokio::spawn(async move {
            let semaphore = Arc::new(Semaphore::new(workers.max(1)));
            let mut tasks: JoinSet<(Ipv4Addr, Result<(), ReportError>)> = JoinSet::new();

            while let Some(result) = rx.recv().await {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let reporter = reporter.clone();
                tasks.spawn(async move {
                    let outcome = reporter.send(&result).await;
                    drop(permit);
                    (result.address, outcome)
                });
            }

            let mut stats = DeliveryStats::default();
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => stats.delivered += 1,
                    Ok((addr, Err(e))) => {
                        warn!("could not report {addr}: {e}");
                        stats.failed += 1;
                    }
                    Err(e) => {
                        error!("report task failed: {e}");
                        stats.failed += 1;
                    }
                }
            }
            stats
        });

        (tx, handle)
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

#[cfg(test)]
mod tests {
    use super::*;
    use lanprobe_common::network::host::ProbeMethod;
    use pnet::util::MacAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn live(d: u8) -> ScanResult {
        ScanResult {
            address: Ipv4Addr::new(192, 168, 1, d),
            alive: true,
            method: ProbeMethod::Tcp(9100),
            mac: Some(MacAddr::new(0x00, 0x1d, 0x1a, 1, 2, 3)),
            reverse_name: Some("hp-laser.lan".into()),
            device_class: DeviceClass::Printer,
        }
    }

    /// Minimal HTTP server answering every request with `status`.
    async fn backend(status: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}{}", listener.local_addr().unwrap(), REPORT_PATH);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let counter = counter.clone();
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut read = 0;
                    loop {
                        let n = stream.read(&mut buf[read..]).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        read += n;
                        let text = String::from_utf8_lossy(&buf[..read]);
                        if let Some(head_end) = text.find("\r\n\r\n") {
                            let length = text[..head_end]
                                .lines()
                                .find_map(|l| {
                                    let lower = l.to_ascii_lowercase();
                                    lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap_or(0))
                                })
                                .unwrap_or(0);
                            if read >= head_end + 4 + length {
                                break;
                            }
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let reply = format!("HTTP/1.1 {status}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok");
                    let _ = stream.write_all(reply.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (url, hits)
    }

    #[test]
    fn dto_uses_backend_field_names() {
        let dto = ReportDto::from(&live(7));
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ip": "192.168.1.7",
                "alive": "sí",
                "via": "tcp",
                "device": "Printer",
                "mac": "00:1d:1a:01:02:03",
                "name": "hp-laser.lan",
            })
        );
    }

    #[test]
    fn dto_placeholders_for_missing_data() {
        let dto = ReportDto::from(&ScanResult::unreachable(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(dto.alive, "no");
        assert_eq!(dto.via, "none");
        assert_eq!(dto.device, "Unknown");
        assert_eq!(dto.mac, "");
        assert_eq!(dto.name, "");
    }

    #[test]
    fn backend_url_shape() {
        let reporter = Reporter::new("10.0.0.2", Duration::from_secs(3)).unwrap();
        assert_eq!(reporter.url(), "http://10.0.0.2:3000/dispositivos/found");
    }

    #[tokio::test]
    async fn created_counts_as_delivered() {
        let (url, hits) = backend("201 Created").await;
        let reporter = Reporter::with_url(&url, Duration::from_secs(3)).unwrap();

        reporter.send(&live(1)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn other_statuses_are_rejections() {
        let (url, _) = backend("500 Internal Server Error").await;
        let reporter = Reporter::with_url(&url, Duration::from_secs(3)).unwrap();

        let err = reporter.send(&live(1)).await.unwrap_err();
        assert!(matches!(err, ReportError::Rejected { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}{}", listener.local_addr().unwrap(), REPORT_PATH);
        drop(listener);
        let reporter = Reporter::with_url(&url, Duration::from_secs(2)).unwrap();

        let err = reporter.send(&live(1)).await.unwrap_err();
        assert!(matches!(err, ReportError::Transport { .. }));
    }

    #[tokio::test]
    async fn pool_drains_queue_and_counts() {
        let (url, hits) = backend("200 OK").await;
        let reporter = Reporter::with_url(&url, Duration::from_secs(3)).unwrap();

        let (tx, handle) = reporter.spawn_pool(2, 8);
        for d in 1..=5 {
            tx.send(live(d)).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats, DeliveryStats { delivered: 5, failed: 0 });
        assert_eq!(hits.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn pool_counts_failures_without_stopping() {
        let (url, _) = backend("404 Not Found").await;
        let reporter = Reporter::with_url(&url, Duration::from_secs(3)).unwrap();

        let (tx, handle) = reporter.spawn_pool(3, 4);
        tx.send(live(1)).await.unwrap();
        tx.send(live(2)).await.unwrap();
        drop(tx);

        assert_eq!(handle.await.unwrap(), DeliveryStats { delivered: 0, failed: 2 });
    }
}
