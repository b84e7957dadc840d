use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use anyhow::Context;
use lanprobe_protocols::icmp;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{self, TransportChannelType, TransportProtocol};
use tracing::trace;

use super::command;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const ECHO_PAYLOAD: &[u8] = b"lanprobe";

/// Arguments for a single-echo `ping` whose own wait matches `timeout`.
pub fn ping_args(addr: Ipv4Addr, timeout: Duration) -> Vec<String> {
    let target = addr.to_string();
    let millis = timeout.as_millis().max(1).to_string();

    if cfg!(target_os = "windows") {
        vec!["-n".into(), "1".into(), "-w".into(), millis, target]
    } else if cfg!(target_os = "macos") {
        vec!["-c".into(), "1".into(), "-W".into(), millis, target]
    } else {
        // iputils only takes whole seconds
        let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
        vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), target]
    }
}

/// Runs the platform `ping` once; the process is killed when `timeout` runs out.
pub async fn system_ping(addr: Ipv4Addr, timeout: Duration) -> bool {
    let args = ping_args(addr, timeout);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    command::succeeds("ping", &args, timeout).await
}

/// Sends one echo request on a raw socket and waits for the matching reply.
/// Errors mean the socket could not be used at all (usually missing privileges).
pub async fn raw_ping(addr: Ipv4Addr, timeout: Duration) -> anyhow::Result<bool> {
    let identifier: u16 = rand::random();
    let sequence: u16 = rand::random();

    tokio::task::spawn_blocking(move || raw_echo(addr, identifier, sequence, timeout))
        .await
        .context("raw ICMP task panicked")?
}

fn raw_echo(addr: Ipv4Addr, identifier: u16, sequence: u16, timeout: Duration) -> anyhow::Result<bool> {
    let (mut tx, mut rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("failed to open ICMP socket")?;

    let request = icmp::create_echo_request(identifier, sequence, ECHO_PAYLOAD)?;
    let packet = IcmpPacket::new(&request).context("failed to view echo request")?;
    tx.send_to(packet, IpAddr::V4(addr))
        .context("failed to send echo request")?;

    let deadline = Instant::now() + timeout;
    let mut replies = transport::icmp_packet_iter(&mut rx);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        match replies.next_with_timeout(remaining)? {
            Some((reply, source)) if source == IpAddr::V4(addr) => {
                if icmp::is_echo_reply(reply.packet(), identifier, sequence) {
                    return Ok(true);
                }
                trace!("ignoring unrelated ICMP from {source}");
            }
            Some(_) => continue,
            None => return Ok(false),
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
