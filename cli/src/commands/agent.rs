//! Agent mode: stay connected to the control server and run the scans it asks for.

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Args;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use lanprobe_common::config::{Config, ScanConfig};
use lanprobe_common::network::host::ScanResult;
use lanprobe_common::network::target;
use lanprobe_core::scanner::{HostCallback, Scanner};
use lanprobe_core::system::AgentFacts;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::report::{DeliveryStats, Reporter};
use crate::terminal::print;

pub const AGENT_PORT: u16 = 8082;
const CLOSE_GRACE: Duration = Duration::from_millis(500);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Control server host, also receiving the scan results
    #[arg(long, env = "LANPROBE_SERVER")]
    pub server: String,

    /// Backend request timeout, in seconds
    #[arg(long, default_value_t = 3)]
    pub backend_timeout: u64,

    /// Concurrent backend requests
    #[arg(long, default_value_t = 20)]
    pub backend_workers: usize,
}

/// Envelope of every control channel message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub agent_id: String,
    pub subnet: String,
    pub cpu_cores: usize,
    pub ram_mb: u64,
    pub is_fallback: bool,
}

impl From<&AgentFacts> for Registration {
    fn from(facts: &AgentFacts) -> Self {
        Self {
            agent_id: facts.agent_id.clone(),
            subnet: facts.subnet.clone(),
            cpu_cores: facts.cpu_cores,
            ram_mb: facts.ram_mb,
            is_fallback: true,
        }
    }
}

pub fn register_message(facts: &AgentFacts) -> anyhow::Result<WsMessage> {
    Ok(WsMessage {
        kind: "register".to_string(),
        data: serde_json::to_value(Registration::from(facts))?,
    })
}

/// Returns the requested third octet for `scan_request` messages and `None`
/// for any other message type.
pub fn parse_scan_request(text: &str) -> anyhow::Result<Option<u8>> {
    let msg: WsMessage = serde_json::from_str(text).context("malformed control message")?;
    if msg.kind != "scan_request" {
        return Ok(None);
    }

    let subnet = match &msg.data["subnet"] {
        Value::String(s) => s
            .trim()
            .parse::<u8>()
            .with_context(|| format!("invalid subnet '{s}'"))?,
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .with_context(|| format!("invalid subnet {n}"))?,
        _ => bail!("scan request without a subnet"),
    };
    Ok(Some(subnet))
}

pub fn scan_range(subnet: u8) -> String {
    format!("192.168.{subnet}.1-255")
}

pub async fn agent(args: AgentArgs, cfg: &Config) -> anyhow::Result<()> {
    let url = format!("ws://{}:{AGENT_PORT}/agents", args.server);
    info!("connecting to {url}");
    let (ws_stream, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("could not connect to {url}"))?;
    let (mut sender, mut receiver) = ws_stream.split();

    let facts = AgentFacts::collect();
    let register = serde_json::to_string(&register_message(&facts)?)?;
    sender
        .send(Message::Text(register.into()))
        .await
        .context("failed to send the registration message")?;
    info!("registered as {} on subnet {}", facts.agent_id, facts.subnet);

    let reporter = Reporter::new(&args.server, Duration::from_secs(args.backend_timeout))?;

    loop {
        let text = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                close(&mut sender).await;
                return Ok(());
            }
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) => {
                    info!("control server closed the connection");
                    return Ok(());
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("control channel error: {e}");
                    return Ok(());
                }
                None => {
                    info!("control channel ended");
                    return Ok(());
                }
            },
        };

        let subnet = match parse_scan_request(text.as_str()) {
            Ok(Some(subnet)) => subnet,
            Ok(None) => {
                debug!("ignoring control message: {}", text.as_str());
                continue;
            }
            Err(e) => {
                warn!("{e:#}");
                continue;
            }
        };

        let cancel = CancellationToken::new();
        let mut scan = pin!(run_scan(subnet, &reporter, args.backend_workers, cfg, cancel.clone()));
        let interrupted = tokio::select! {
            outcome = &mut scan => {
                log_outcome(outcome);
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };

        if interrupted {
            warn!("interrupted, finishing hosts already in flight");
            cancel.cancel();
            log_outcome(scan.await);
            close(&mut sender).await;
            return Ok(());
        }
    }
}

async fn run_scan(
    subnet: u8,
    reporter: &Reporter,
    workers: usize,
    cfg: &Config,
    cancel: CancellationToken,
) -> anyhow::Result<(usize, DeliveryStats)> {
    let range = scan_range(subnet);
    let addresses = target::expand(&range)?;
    info!("scan of {range} requested");

    let (tx, pool) = reporter.spawn_pool(workers, addresses.len());
    let live = !cfg.quiet;
    let on_alive: HostCallback = Arc::new(move |result: &ScanResult| {
        if live {
            print::host_found(result);
        }
        if let Err(e) = tx.try_send(result.clone()) {
            warn!("dropping report for {}: {e}", result.address);
        }
    });

    let results = Scanner::new(ScanConfig::agent())
        .with_cancellation(cancel)
        .scan(&addresses, Some(on_alive))
        .await;
    let stats = pool.await.context("backend delivery pool failed")?;
    Ok((results.iter().filter(|r| r.alive).count(), stats))
}

fn log_outcome(outcome: anyhow::Result<(usize, DeliveryStats)>) {
    match outcome {
        Ok((alive, stats)) => info!(
            "scan complete: {alive} hosts alive, {} reported, {} failed",
            stats.delivered, stats.failed
        ),
        Err(e) => warn!("scan failed: {e:#}"),
    }
}

/// Sends a normal close frame and gives it a moment to leave.
async fn close(sender: &mut WsSink) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    };
    if let Err(e) = sender.send(Message::Close(Some(frame))).await {
        warn!("failed to send close frame: {e}");
    }
    tokio::time::sleep(CLOSE_GRACE).await;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
