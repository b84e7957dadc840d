use std::net::Ipv4Addr;
use std::sync::OnceLock;
use std::time::Duration;

use lanprobe_protocols::http::HttpHints;
use reqwest::Client;
use reqwest::header::SERVER;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (scan)";
/// Body bytes buffered while looking for a title.
const MAX_BODY_BYTES: usize = 64 * 1024;

static CLIENT: OnceLock<Option<Client>> = OnceLock::new();

fn client() -> Option<&'static Client> {
    CLIENT
        .get_or_init(|| {
            Client::builder()
                .user_agent(USER_AGENT)
                .no_proxy()
                .pool_max_idle_per_host(0)
                .build()
                .inspect_err(|e| debug!("http client unavailable: {e}"))
                .ok()
        })
        .as_ref()
}

/// `GET http://addr:port/`, returning the `Server` header and page title.
/// Any transport failure or an answer with neither gives `None`.
pub async fn fetch_hints(addr: Ipv4Addr, port: u16, limit: Duration) -> Option<HttpHints> {
    let url = format!("http://{addr}:{port}/");
    let mut response = match client()?.get(&url).timeout(limit).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!("GET {url} failed: {e}");
            return None;
        }
    };

    let server = response
        .headers()
        .get(SERVER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut body: Vec<u8> = Vec::new();
    while body.len() < MAX_BODY_BYTES {
        match response.chunk().await {
            Ok(Some(chunk)) => body.extend_from_slice(&chunk),
            _ => break,
        }
    }
    body.truncate(MAX_BODY_BYTES);

    let hints = HttpHints::from_response(server.as_deref(), &String::from_utf8_lossy(&body));
    (!hints.is_empty()).then_some(hints)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
