use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;
use serde::{Serialize, Serializer};

/// How liveness was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProbeMethod {
    #[default]
    None,
    Icmp,
    Tcp(u16),
}

impl ProbeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeMethod::None => "none",
            ProbeMethod::Icmp => "icmp",
            ProbeMethod::Tcp(_) => "tcp",
        }
    }

    pub fn is_alive(&self) -> bool {
        !matches!(self, ProbeMethod::None)
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            ProbeMethod::Tcp(port) => Some(*port),
            _ => None,
        }
    }

    /// Human form used in the text report: `ICMP`, `TCP/443` or `-`.
    pub fn label(&self) -> String {
        match self {
            ProbeMethod::None => "-".to_string(),
            ProbeMethod::Icmp => "ICMP".to_string(),
            ProbeMethod::Tcp(port) => format!("TCP/{port}"),
        }
    }
}

/// Coarse device category assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceClass {
    Printer,
    Camera,
    VoipPhone,
    Pc,
    Mobile,
    #[default]
    Unknown,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Printer => "Printer",
            DeviceClass::Camera => "Camera",
            DeviceClass::VoipPhone => "VoIP phone",
            DeviceClass::Pc => "PC",
            DeviceClass::Mobile => "Mobile",
            DeviceClass::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DeviceClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Everything learned about one address during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub address: Ipv4Addr,
    pub alive: bool,
    pub method: ProbeMethod,
    pub mac: Option<MacAddr>,
    pub reverse_name: Option<String>,
    pub device_class: DeviceClass,
}

impl ScanResult {
    /// The negative record: nothing answered and nothing was learned.
    pub fn unreachable(address: Ipv4Addr) -> Self {
        Self {
            address,
            alive: false,
            method: ProbeMethod::None,
            mac: None,
            reverse_name: None,
            device_class: DeviceClass::Unknown,
        }
    }

    pub fn mac_string(&self) -> Option<String> {
        self.mac.map(|mac| mac.to_string())
    }

    /// One fixed-width report line; missing fields print as `-`.
    pub fn format_line(&self) -> String {
        let alive = if self.alive { "yes" } else { "no" };
        let method = if self.alive {
            self.method.label()
        } else {
            "-".to_string()
        };
        let mac = self.mac_string().unwrap_or_else(|| "-".to_string());
        let name = match self.reverse_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "-",
        };

        format!(
            "{:<15}  alive:{:<3}  via:{:<10}  device:{:<20}  mac:{:<17}  name:{}",
            self.address.to_string(),
            alive,
            method,
            self.device_class.as_str(),
            mac,
            name
        )
    }
}

/// Flat transport shape of a [`ScanResult`].
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord<'a> {
    address: String,
    alive: bool,
    method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reverse_name: Option<&'a str>,
    device_class: DeviceClass,
}

impl Serialize for ScanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ResultRecord {
            address: self.address.to_string(),
            alive: self.alive,
            method: self.method.as_str(),
            port: self.method.port(),
            mac: self.mac_string(),
            reverse_name: self.reverse_name.as_deref().filter(|name| !name.is_empty()),
            device_class: self.device_class,
        }
        .serialize(serializer)
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
