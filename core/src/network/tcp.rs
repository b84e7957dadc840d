use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Bytes read when grabbing a service banner.
pub const BANNER_READ_LEN: usize = 1024;

async fn open(addr: Ipv4Addr, port: u16, limit: Duration) -> Option<TcpStream> {
    let socket_addr: SocketAddr = SocketAddrV4::new(addr, port).into();

    match timeout(limit, TcpStream::connect(socket_addr)).await {
        Ok(Ok(stream)) => Some(stream),
        Ok(Err(e)) => {
            trace!("{socket_addr} refused: {e}");
            None
        }
        Err(_elapsed) => None,
    }
}

/// Completes a full handshake and immediately drops the connection.
pub async fn connect(addr: Ipv4Addr, port: u16, limit: Duration) -> bool {
    open(addr, port, limit).await.is_some()
}

/// Connects and returns whatever the peer sends within `limit`, lossily
/// decoded. Silent services give `None`.
pub async fn read_banner(addr: Ipv4Addr, port: u16, limit: Duration) -> Option<String> {
    let mut stream = open(addr, port, limit).await?;
    let mut buf = vec![0u8; BANNER_READ_LEN];

    match timeout(limit, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => Some(String::from_utf8_lossy(&buf[..n]).into_owned()),
        _ => None,
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
