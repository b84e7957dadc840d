//! Pure encoders and text scrapers used by the probes.
//!
//! Nothing in here touches the network; every function works on bytes or
//! strings handed to it, which keeps the parsing rules unit-testable.

pub mod arp;
pub mod banner;
pub mod http;
pub mod icmp;
