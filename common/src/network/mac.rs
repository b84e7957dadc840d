use pnet::util::MacAddr;

/// Characters stripped from both ends of a token before it is tested for MAC shape.
const TOKEN_PUNCTUATION: &[char] = &['[', ']', ',', '(', ')'];

/// Parses a MAC-shaped token: six groups of exactly two hex digits separated
/// by `:` or `-`, optionally wrapped in brackets or trailing commas.
///
/// The all-zero address is what incomplete neighbor entries show, so it is
/// reported as `None`.
pub fn parse_mac_token(token: &str) -> Option<MacAddr> {
    let clean = token.trim().trim_matches(TOKEN_PUNCTUATION);

    let groups: Vec<&str> = clean.split([':', '-']).collect();
    if groups.len() != 6 {
        return None;
    }

    let mut octets = [0u8; 6];
    for (octet, group) in octets.iter_mut().zip(&groups) {
        if group.len() != 2 || !group.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        *octet = u8::from_str_radix(group, 16).ok()?;
    }

    let [a, b, c, d, e, f] = octets;
    let mac = MacAddr::new(a, b, c, d, e, f);
    if mac == MacAddr::zero() {
        return None;
    }
    Some(mac)
}

/// The vendor-identifying first three octets of a hardware address.
pub fn oui(mac: MacAddr) -> [u8; 3] {
    [mac.0, mac.1, mac.2]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_and_dash_forms_normalize_to_lowercase() {
        let a = parse_mac_token("AA:BB:CC:0D:0E:0F").unwrap();
        let b = parse_mac_token("aa-bb-cc-0d-0e-0f").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "aa:bb:cc:0d:0e:0f");
    }

    #[test]
    fn surrounding_punctuation_is_ignored() {
        assert!(parse_mac_token("[aa:bb:cc:dd:ee:ff]").is_some());
        assert!(parse_mac_token("(aa:bb:cc:dd:ee:ff),").is_some());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(parse_mac_token("aa:bb:cc:dd:ee").is_none());
        assert!(parse_mac_token("aa:bb:cc:dd:ee:f").is_none());
        assert!(parse_mac_token("aa:bb:cc:dd:ee:gg").is_none());
        assert!(parse_mac_token("aabb.ccdd.eeff").is_none());
        assert!(parse_mac_token("192.168.1.1").is_none());
        assert!(parse_mac_token("").is_none());
    }

    #[test]
    fn all_zero_mac_counts_as_missing() {
        assert!(parse_mac_token("00:00:00:00:00:00").is_none());
        assert!(parse_mac_token("00-00-00-00-00-00").is_none());
    }

    #[test]
    fn oui_is_first_three_octets() {
        let mac = MacAddr::new(0xa0, 0xb1, 0xc2, 1, 2, 3);
        assert_eq!(oui(mac), [0xa0, 0xb1, 0xc2]);
    }
}
