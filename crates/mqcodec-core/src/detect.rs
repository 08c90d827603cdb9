//! Packet boundary detection over a partially received stream.

use crate::error::Result;
use crate::packet::PacketType;
use crate::varint;

/// Total length announced by the fixed header at the start of `src`.
///
/// `Ok(None)` while the header itself is incomplete. Only the header is
/// inspected; the caller compares the result against what it has buffered.
pub fn packet_len(src: &[u8]) -> Result<Option<usize>> {
    if src.len() < 2 {
        return Ok(None);
    }
    Ok(varint::decode(&src[1..])?.map(|(remaining_length, len_bytes)| {
        1 + len_bytes + remaining_length
    }))
}

/// Detect whether `src` starts with a complete packet.
///
/// Returns the packet's total length and type, or a length of 0 when more
/// bytes are needed. A malformed remaining length also reports 0; decoding
/// surfaces the actual error. The type is `None` for the reserved nibbles
/// 0 and 15. The payload is not validated.
///
/// ```
/// use mqcodec_core::{detect_packet, PacketType};
///
/// assert_eq!(detect_packet(&[0xC0, 0x00]), (2, Some(PacketType::Pingreq)));
/// assert_eq!(detect_packet(&[0x30, 0x80]).0, 0);
/// ```
pub fn detect_packet(src: &[u8]) -> (usize, Option<PacketType>) {
    let packet_type = src
        .first()
        .and_then(|&b| PacketType::try_from(b >> 4).ok());

    match packet_len(src) {
        Ok(Some(total)) if total <= src.len() => (total, packet_type),
        _ => (0, packet_type),
    }
}
