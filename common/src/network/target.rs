//! # Scan Target Model
//!
//! Turns a user supplied target specification into the ordered list of IPv4
//! addresses a scan will visit.
//!
//! Supported forms, tried in this order:
//! * A CIDR block (e.g., `192.168.1.0/24`), network and broadcast included.
//! * A last-octet shorthand (e.g., `192.168.1.10-50`).
//! * A full range (e.g., `10.0.0.250-10.0.1.5`).
//! * A single IPv4 address (e.g., `203.0.113.9`).
//!
//! Several of the above may be joined with commas; the result keeps the order
//! of first appearance and drops duplicates.

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use thiserror::Error;

use crate::network::range::{self, Ipv4Range};

/// Upper bound on how many addresses a single specification may expand to (a `/8`).
pub const MAX_EXPANSION: u64 = 1 << 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("empty target specification")]
    Empty,
    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),
    #[error("invalid IP range '{0}'")]
    InvalidRange(String),
    #[error("only IPv4 is supported: '{0}'")]
    NotIpv4(String),
    #[error("'{spec}' expands to {count} addresses (limit {MAX_EXPANSION})")]
    TooLarge { spec: String, count: u64 },
    #[error("unrecognized target format: '{0}'")]
    Unrecognized(String),
}

/// A parsed target specification together with its expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpec {
    raw: String,
    addresses: Vec<Ipv4Addr>,
}

impl AddressSpec {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }
}

impl FromStr for AddressSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            raw: s.trim().to_string(),
            addresses: expand(s)?,
        })
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Expands a specification (optionally comma separated) into individual addresses.
///
/// The size limit applies to each part and to the sum over all parts, counted
/// before duplicates are dropped, so nothing is materialized for an oversized list.
pub fn expand(spec: &str) -> Result<Vec<Ipv4Addr>, TargetError> {
    let spec = spec.trim();
    let ranges = spec
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_part)
        .collect::<Result<Vec<Ipv4Range>, TargetError>>()?;
    if ranges.is_empty() {
        return Err(TargetError::Empty);
    }

    let total: u64 = ranges.iter().map(Ipv4Range::host_count).sum();
    within_limit(spec, total)?;

    let mut seen: HashSet<Ipv4Addr> = HashSet::new();
    let mut addresses: Vec<Ipv4Addr> = Vec::new();
    for addr in ranges.iter().flat_map(Ipv4Range::to_iter) {
        if seen.insert(addr) {
            addresses.push(addr);
        }
    }
    Ok(addresses)
}

fn parse_part(spec: &str) -> Result<Ipv4Range, TargetError> {
    let range = parse_range(spec)?;
    within_limit(spec, range.host_count())?;
    Ok(range)
}

fn parse_range(spec: &str) -> Result<Ipv4Range, TargetError> {
    if spec.contains('/') {
        return parse_cidr(spec);
    }

    if spec.matches('-').count() == 1 {
        if let Some(range) = parse_last_octet(spec) {
            return Ok(range);
        }
        return parse_full_range(spec);
    }

    match spec.parse::<Ipv4Addr>() {
        Ok(addr) => Ok(Ipv4Range::new(addr, addr)),
        Err(_) => Err(TargetError::Unrecognized(spec.to_string())),
    }
}

fn within_limit(spec: &str, count: u64) -> Result<(), TargetError> {
    if count > MAX_EXPANSION {
        return Err(TargetError::TooLarge {
            spec: spec.to_string(),
            count,
        });
    }
    Ok(())
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr(s: &str) -> Result<Ipv4Range, TargetError> {
    let invalid = || TargetError::InvalidCidr(s.to_string());
    let (ip_str, prefix_str) = s.split_once('/').ok_or_else(invalid)?;

    let ipv4_addr = match ip_str.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4,
        Ok(IpAddr::V6(_)) => return Err(TargetError::NotIpv4(s.to_string())),
        Err(_) => return Err(invalid()),
    };
    let prefix = prefix_str.trim().parse::<u8>().map_err(|_| invalid())?;

    range::cidr_range(ipv4_addr, prefix).map_err(|_| invalid())
}

/// Parses the shorthand "192.168.1.10-50", which keeps the first three octets fixed.
fn parse_last_octet(s: &str) -> Option<Ipv4Range> {
    if s.contains(char::is_whitespace) {
        return None;
    }
    let (start_str, end_str) = s.split_once('-')?;
    let start_addr = start_str.parse::<Ipv4Addr>().ok()?;
    let last_octet = end_str.parse::<u8>().ok()?;

    let [a, b, c, _] = start_addr.octets();
    Some(Ipv4Range::new(start_addr, Ipv4Addr::new(a, b, c, last_octet)))
}

/// Parses a range string like "10.0.0.1-10.0.0.200".
fn parse_full_range(s: &str) -> Result<Ipv4Range, TargetError> {
    let (start_str, end_str) = s
        .split_once('-')
        .ok_or_else(|| TargetError::InvalidRange(s.to_string()))?;

    let start = start_str.trim().parse::<IpAddr>();
    let end = end_str.trim().parse::<IpAddr>();

    match (start, end) {
        (Ok(IpAddr::V4(start_addr)), Ok(IpAddr::V4(end_addr))) => {
            Ok(Ipv4Range::new(start_addr, end_addr))
        }
        (Ok(_), Ok(_)) => Err(TargetError::NotIpv4(s.to_string())),
        _ => Err(TargetError::InvalidRange(s.to_string())),
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
