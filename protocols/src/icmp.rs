use anyhow::Context;
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpPacket, IcmpTypes, checksum};

/// ICMP echo header: type, code, checksum, identifier, sequence.
pub const ICMP_ECHO_HDR_LEN: usize = 8;

/// Builds an ICMPv4 echo request with a valid checksum.
pub fn create_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_ECHO_HDR_LEN + payload.len()];
    {
        let mut echo = MutableEchoRequestPacket::new(&mut buffer)
            .context("failed to create echo request packet")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCode(0));
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_payload(payload);
        echo.set_checksum(0);
    }

    let csm = {
        let icmp = IcmpPacket::new(&buffer).context("failed to view ICMP packet")?;
        checksum(&icmp)
    };
    let mut echo = MutableEchoRequestPacket::new(&mut buffer)
        .context("failed to create echo request packet")?;
    echo.set_checksum(csm);
    let bytes = echo.packet().to_vec();

    Ok(bytes)
}

/// True when `bytes` (an ICMP message, IP header already stripped) is the
/// echo reply matching `identifier` and `sequence`.
pub fn is_echo_reply(bytes: &[u8], identifier: u16, sequence: u16) -> bool {
    let Some(reply) = EchoReplyPacket::new(bytes) else {
        return false;
    };
    reply.get_icmp_type() == IcmpTypes::EchoReply
        && reply.get_identifier() == identifier
        && reply.get_sequence_number() == sequence
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
    use pnet::packet::icmp::echo_reply::MutableEchoReplyPacket;

    fn reply(identifier: u16, sequence: u16) -> Vec<u8> {
        let mut buffer = vec![0u8; ICMP_ECHO_HDR_LEN + 4];
        let mut echo = MutableEchoReplyPacket::new(&mut buffer).unwrap();
        echo.set_icmp_type(IcmpTypes::EchoReply);
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        buffer
    }

    #[test]
    fn echo_request_has_expected_layout() {
        let pkt = create_echo_request(0xbeef, 7, b"ping").unwrap();
        assert_eq!(pkt.len(), ICMP_ECHO_HDR_LEN + 4);
        assert_eq!(pkt[0], 8);
        assert_eq!(pkt[1], 0);
        assert_eq!(&pkt[4..6], &[0xbe, 0xef]);
        assert_eq!(&pkt[6..8], &[0, 7]);
        assert_eq!(&pkt[8..], b"ping");
    }

    #[test]
    fn echo_request_checksum_verifies() {
        let pkt = create_echo_request(1, 1, b"abcdef").unwrap();
        let icmp = IcmpPacket::new(&pkt).unwrap();
        assert_eq!(checksum(&icmp), icmp.get_checksum());
    }

    #[test]
    fn matching_reply_is_recognized() {
        assert!(is_echo_reply(&reply(42, 3), 42, 3));
    }

    #[test]
    fn mismatched_or_foreign_packets_are_ignored() {
        assert!(!is_echo_reply(&reply(42, 3), 43, 3));
        assert!(!is_echo_reply(&reply(42, 3), 42, 4));
        let request = create_echo_request(42, 3, &[]).unwrap();
        assert!(!is_echo_reply(&request, 42, 3));
        assert!(!is_echo_reply(&[0, 0], 42, 3));
    }
}
