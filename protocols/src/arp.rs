//! Scrapers for the text the operating system prints about its neighbor cache.
//!
//! Each function answers "what hardware address does this table give for
//! `ip`", returning `None` for missing, incomplete or all-zero entries.

use std::net::Ipv4Addr;

use lanprobe_common::network::mac::parse_mac_token;
use pnet::util::MacAddr;

const TOKEN_PUNCTUATION: &[char] = &['(', ')', '[', ']', ','];

/// Reads the Linux `/proc/net/arp` table:
///
/// ```text
/// IP address       HW type     Flags       HW address            Mask     Device
/// 192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
/// ```
pub fn parse_proc_net_arp(content: &str, ip: Ipv4Addr) -> Option<MacAddr> {
    let wanted = ip.to_string();
    content
        .lines()
        .filter(|line| !line.contains("IP address"))
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|fields| fields.len() >= 4 && fields[0] == wanted)
        .and_then(|fields| parse_mac_token(fields[3]))
}

/// Reads `ip neigh show <addr>` output, e.g.
/// `192.168.1.1 dev eth0 lladdr aa:bb:cc:dd:ee:ff REACHABLE`.
pub fn parse_ip_neigh(output: &str) -> Option<MacAddr> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        tokens.find(|t| *t == "lladdr")?;
        tokens.next().and_then(parse_mac_token)
    })
}

/// Reads the output of the `arp` utility, whose layout differs per platform:
///
/// ```text
/// linux:   192.168.1.1  ether  aa:bb:cc:dd:ee:ff  C  eth0
/// macos:   ? (192.168.1.1) at aa:bb:cc:dd:ee:ff on en0 ifscope [ethernet]
/// windows:   192.168.1.1           aa-bb-cc-dd-ee-ff     dynamic
/// ```
///
/// Lines naming `ip` are searched first. If none of them carries a MAC, the
/// first MAC-shaped token anywhere in the output is taken.
pub fn parse_arp_output(output: &str, ip: Ipv4Addr) -> Option<MacAddr> {
    let wanted = ip.to_string();

    let on_target_line = output
        .lines()
        .filter(|line| {
            line.split_whitespace()
                .any(|t| t.trim_matches(TOKEN_PUNCTUATION) == wanted)
        })
        .find_map(first_mac_token);

    on_target_line.or_else(|| first_mac_token(output))
}

fn first_mac_token(text: &str) -> Option<MacAddr> {
    text.split_whitespace().find_map(parse_mac_token)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
