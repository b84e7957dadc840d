//! Hardware-vendor knowledge keyed by OUI.
//!
//! The tables here are immutable and shared by every scan task; the heavier
//! IEEE registry lookup lives behind [`VendorRepository`] in `lanprobe-core`.

use pnet::util::MacAddr;

use crate::network::mac::oui;

/// Resolves a hardware address to a manufacturer name.
pub trait VendorRepository: Send + Sync {
    fn get_vendor(&self, mac: MacAddr) -> Option<String>;
}

/// Prefixes the classifier cares about, checked before any registry lookup.
pub const VENDOR_PREFIXES: &[([u8; 3], &str)] = &[
    ([0x00, 0x1e, 0x65], "Apple"),
    ([0xf8, 0xf6, 0x3d], "Apple"),
    ([0x00, 0x03, 0x93], "Apple"),
    ([0x3c, 0x07, 0x54], "Apple"),
    ([0x34, 0xb3, 0xf6], "Samsung"),
    ([0x34, 0xa4, 0xf9], "Samsung"),
    ([0x3c, 0x5a, 0x37], "Dahua Camera"),
    ([0x3c, 0x5a, 0x47], "Dahua Camera"),
    ([0x3c, 0xef, 0x8c], "Dahua Camera"),
    ([0x00, 0x1d, 0x1a], "Hikvision Camera"),
    ([0x00, 0x1e, 0xc0], "Hikvision Camera"),
    ([0x44, 0x19, 0xb6], "Hikvision Camera"),
    ([0x00, 0x40, 0x8c], "Axis Communications"),
    ([0xac, 0xcc, 0x8e], "Axis Communications"),
    ([0xa0, 0xb1, 0xc2], "Yealink VoIP"),
    ([0x80, 0x5e, 0xc0], "Yealink VoIP"),
    ([0x00, 0x04, 0xf2], "Polycom"),
    ([0x00, 0x0b, 0x82], "Grandstream VoIP"),
];

/// Handsets whose OUI alone is a strong enough hint to call an otherwise
/// unclassified live host a phone.
pub const MOBILE_OUIS: &[([u8; 3], &str)] = &[
    ([0xc2, 0xa1, 0x6f], "Apple"),
    ([0xd4, 0x61, 0x9d], "Samsung"),
    ([0xf0, 0x27, 0x2d], "Xiaomi"),
    ([0x44, 0x65, 0x0d], "Huawei"),
    ([0xac, 0xbc, 0x32], "Motorola"),
    ([0x34, 0x86, 0xda], "Honor"),
];

/// Coarse grouping of a vendor name, as far as device classification cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorKind {
    Camera,
    Voip,
    Apple,
    Other,
}

impl VendorKind {
    pub fn of(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |tokens: &[&str]| tokens.iter().any(|t| lower.contains(t));

        if has(&["hikvision", "dahua", "axis", "camera"]) {
            VendorKind::Camera
        } else if has(&["yealink", "polycom", "grandstream", "voip"]) {
            VendorKind::Voip
        } else if lower.starts_with("apple") {
            VendorKind::Apple
        } else {
            VendorKind::Other
        }
    }
}

fn find(table: &[([u8; 3], &'static str)], mac: MacAddr) -> Option<&'static str> {
    let prefix = oui(mac);
    table
        .iter()
        .find(|(candidate, _)| *candidate == prefix)
        .map(|(_, name)| *name)
}

/// Brand of a known handset OUI.
pub fn mobile_brand(mac: MacAddr) -> Option<&'static str> {
    find(MOBILE_OUIS, mac)
}

/// Looks addresses up in [`VENDOR_PREFIXES`] only.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticVendors;

impl VendorRepository for StaticVendors {
    fn get_vendor(&self, mac: MacAddr) -> Option<String> {
        find(VENDOR_PREFIXES, mac).map(str::to_string)
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
