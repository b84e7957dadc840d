use std::time::Duration;

use tracing::debug;

/// Ports tried for TCP liveness when the caller supplies none.
pub const DEFAULT_PORTS: &[u16] = &[
    22, 80, 443, 3389, 445, 139, 9100, 631, 515, 3306, 53, 8080, 137, 161,
];

/// What an unusable `--ports` value falls back to.
pub const FALLBACK_PORTS: &[u16] = &[22, 80, 443];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_CONCURRENCY: usize = 200;

/// Tuning knobs for a single scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Candidate TCP ports, tried in order when ICMP gets no answer.
    pub ports: Vec<u16>,
    /// Upper bound for every individual network operation.
    pub timeout: Duration,
    /// Maximum number of hosts probed at once.
    pub concurrency: usize,
    /// Look up the PTR record of every address, answering or not.
    pub reverse_dns: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            reverse_dns: true,
        }
    }
}

impl ScanConfig {
    /// Fixed settings used for remotely triggered scans.
    pub fn agent() -> Self {
        Self::default()
    }

    /// The candidate list actually probed; an empty list means the fallback set.
    pub fn effective_ports(&self) -> &[u16] {
        if self.ports.is_empty() {
            FALLBACK_PORTS
        } else {
            &self.ports
        }
    }
}

/// Parses a comma separated port list. Unparseable or zero entries are
/// skipped; if nothing usable remains the result is [`FALLBACK_PORTS`].
pub fn parse_ports(s: &str) -> Vec<u16> {
    let mut ports = Vec::new();
    for part in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.parse::<u16>() {
            Ok(port) if port > 0 => ports.push(port),
            _ => debug!("ignoring invalid port '{part}'"),
        }
    }

    if ports.is_empty() {
        return FALLBACK_PORTS.to_vec();
    }
    ports
}

/// Output behaviour of the command line front-end.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Skip reverse DNS lookups.
    pub no_dns: bool,
    /// Only print the final report.
    pub quiet: bool,
    /// Emit the report as JSON instead of text lines.
    pub json: bool,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
