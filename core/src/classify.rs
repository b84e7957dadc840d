//! # Device Classification
//!
//! Assigns a [`DeviceClass`] from cheap, observable evidence: which well-known
//! ports accept a connection, who manufactured the network card, what the
//! web interface calls itself and what the host is named.
//!
//! The heuristics live in [`RULES`], an ordered table evaluated top to bottom;
//! the first rule whose [`Condition`] holds decides the class, and a host no
//! rule matches is [`DeviceClass::Unknown`]. Evidence is gathered lazily and
//! cached, so a port is never probed twice and the web page is fetched at most
//! once per host.
//!
//! Some rules are deliberately low-confidence. Notably, any Apple hardware
//! that neither advertises a phone nor a Mac in its name is called `Mobile`.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use lanprobe_common::network::host::DeviceClass;
use lanprobe_common::network::vendor::{VendorKind, mobile_brand};
use pnet::util::MacAddr;
use tracing::debug;

use crate::network::NetworkOps;

/// Ports that may host a web interface, tried in order.
pub const WEB_PORTS: &[u16] = &[80, 8080, 8000];

/// The web page is always fetched from here, whichever web port answered.
pub const HTTP_PORT: u16 = 80;

#[derive(Debug, Clone, Copy)]
pub enum Condition {
    /// At least one of the ports accepts a TCP connection.
    AnyPortOpen(&'static [u16]),
    /// The MAC vendor falls in this group.
    Vendor(VendorKind),
    /// One of the ports is open and the `Server` header or title served on
    /// [`HTTP_PORT`] contains a token.
    HttpMentions {
        ports: &'static [u16],
        tokens: &'static [&'static str],
    },
    /// The MAC vendor falls in the group and the host name contains a token.
    NameMentions {
        vendor: VendorKind,
        tokens: &'static [&'static str],
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub condition: Condition,
    pub class: DeviceClass,
}

/// Classification rules in priority order; the first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        name: "printer-ports",
        condition: Condition::AnyPortOpen(&[9100, 631, 515]),
        class: DeviceClass::Printer,
    },
    Rule {
        name: "camera-vendor",
        condition: Condition::Vendor(VendorKind::Camera),
        class: DeviceClass::Camera,
    },
    Rule {
        name: "voip-vendor",
        condition: Condition::Vendor(VendorKind::Voip),
        class: DeviceClass::VoipPhone,
    },
    Rule {
        name: "rtsp",
        condition: Condition::AnyPortOpen(&[554]),
        class: DeviceClass::Camera,
    },
    Rule {
        name: "sip",
        condition: Condition::AnyPortOpen(&[5060, 5061]),
        class: DeviceClass::VoipPhone,
    },
    Rule {
        name: "workstation-services",
        condition: Condition::AnyPortOpen(&[445, 139, 3389, 22]),
        class: DeviceClass::Pc,
    },
    Rule {
        name: "web-camera",
        condition: Condition::HttpMentions {
            ports: WEB_PORTS,
            tokens: &["hikvision", "dahua", "axis"],
        },
        class: DeviceClass::Camera,
    },
    Rule {
        name: "web-mobile",
        condition: Condition::HttpMentions {
            ports: WEB_PORTS,
            tokens: &["android", "iphone", "apple"],
        },
        class: DeviceClass::Mobile,
    },
    Rule {
        name: "web-voip",
        condition: Condition::HttpMentions {
            ports: WEB_PORTS,
            tokens: &["phone", "sip", "asterisk"],
        },
        class: DeviceClass::VoipPhone,
    },
    Rule {
        name: "apple-handset",
        condition: Condition::NameMentions {
            vendor: VendorKind::Apple,
            tokens: &["iphone", "ipad"],
        },
        class: DeviceClass::Mobile,
    },
    Rule {
        name: "apple-computer",
        condition: Condition::NameMentions {
            vendor: VendorKind::Apple,
            tokens: &["mac"],
        },
        class: DeviceClass::Pc,
    },
    // Low confidence: most Apple hardware on a LAN is a phone or tablet.
    Rule {
        name: "apple-default",
        condition: Condition::Vendor(VendorKind::Apple),
        class: DeviceClass::Mobile,
    },
];

/// What is known, or can be found out, about one host.
pub struct Evidence<'a> {
    ops: &'a dyn NetworkOps,
    addr: Ipv4Addr,
    probe_timeout: Duration,
    vendor: Option<VendorKind>,
    name: String,
    ports: HashMap<u16, bool>,
    http_text: Option<Option<String>>,
}

impl<'a> Evidence<'a> {
    /// `timeout` is the scan timeout; probes made here use half of it.
    pub fn new(
        ops: &'a dyn NetworkOps,
        addr: Ipv4Addr,
        timeout: Duration,
        vendor: Option<&str>,
        reverse_name: Option<&str>,
    ) -> Self {
        Self {
            ops,
            addr,
            probe_timeout: timeout / 2,
            vendor: vendor.map(VendorKind::of),
            name: reverse_name.unwrap_or_default().to_lowercase(),
            ports: HashMap::new(),
            http_text: None,
        }
    }

    async fn port_open(&mut self, port: u16) -> bool {
        if let Some(&open) = self.ports.get(&port) {
            return open;
        }
        let open = self.ops.tcp_connect(self.addr, port, self.probe_timeout).await;
        self.ports.insert(port, open);
        open
    }

    async fn any_open(&mut self, ports: &[u16]) -> bool {
        for &port in ports {
            if self.port_open(port).await {
                return true;
            }
        }
        false
    }

    /// Lower-cased server and title of the page on [`HTTP_PORT`], fetched once
    /// and only if one of `ports` is open.
    async fn http_text(&mut self, ports: &[u16]) -> Option<String> {
        if let Some(cached) = &self.http_text {
            return cached.clone();
        }

        let text = if self.any_open(ports).await {
            self.ops
                .http_hints(self.addr, HTTP_PORT, self.probe_timeout)
                .await
                .map(|hints| hints.fingerprint_text())
        } else {
            None
        };
        self.http_text = Some(text.clone());
        text
    }

    pub async fn holds(&mut self, condition: &Condition) -> bool {
        match *condition {
            Condition::AnyPortOpen(ports) => self.any_open(ports).await,
            Condition::Vendor(kind) => self.vendor == Some(kind),
            Condition::HttpMentions { ports, tokens } => self
                .http_text(ports)
                .await
                .is_some_and(|text| tokens.iter().any(|t| text.contains(t))),
            Condition::NameMentions { vendor, tokens } => {
                self.vendor == Some(vendor) && tokens.iter().any(|t| self.name.contains(t))
            }
        }
    }
}

/// Runs [`RULES`] against the host and returns the first matching rule.
pub async fn first_match(evidence: &mut Evidence<'_>) -> Option<&'static Rule> {
    for rule in RULES {
        if evidence.holds(&rule.condition).await {
            return Some(rule);
        }
    }
    None
}

/// Classifies `addr`; never fails, defaulting to [`DeviceClass::Unknown`].
pub async fn classify(
    ops: &dyn NetworkOps,
    addr: Ipv4Addr,
    timeout: Duration,
    vendor: Option<&str>,
    reverse_name: Option<&str>,
) -> DeviceClass {
    let mut evidence = Evidence::new(ops, addr, timeout, vendor, reverse_name);
    match first_match(&mut evidence).await {
        Some(rule) => {
            debug!("{addr} matched rule '{}' -> {}", rule.name, rule.class);
            rule.class
        }
        None => DeviceClass::Unknown,
    }
}

/// Second chance for live hosts nothing matched: a handset OUI makes them
/// `Mobile`, and names them `"<Brand> Mobile"` if they have no name yet.
pub fn mobile_fallback(
    alive: bool,
    class: DeviceClass,
    mac: Option<MacAddr>,
    name: Option<String>,
) -> (DeviceClass, Option<String>) {
    if !alive || class != DeviceClass::Unknown {
        return (class, name);
    }
    let Some(brand) = mac.and_then(mobile_brand) else {
        return (class, name);
    };

    let name = match name {
        Some(existing) if !existing.is_empty() => Some(existing),
        _ => Some(format!("{brand} Mobile")),
    };
    (DeviceClass::Mobile, name)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
