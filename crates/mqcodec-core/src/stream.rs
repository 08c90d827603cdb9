//! Stream framing: repeated detect + decode over bytes as they arrive.

use bytes::BytesMut;
use log::trace;

use crate::detect::{detect_packet, packet_len};
use crate::error::{Error, Result};
use crate::packet::Packet;
use crate::varint::{MAX_REMAINING_LENGTH, MAX_VARINT_LEN};

/// Largest packet the wire format can describe.
pub const MAX_PACKET_SIZE: usize = 1 + MAX_VARINT_LEN + MAX_REMAINING_LENGTH;

/// Default read buffer capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Size limits applied while framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum total packet size in bytes (0 = no limit).
    pub max_packet_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_packet_size: 1024 * 1024,
        }
    }
}

impl Limits {
    pub fn unlimited() -> Self {
        Self { max_packet_size: 0 }
    }

    /// Fail with [`Error::PacketTooLarge`] if `size` exceeds the limit.
    pub fn check(&self, size: usize) -> Result<()> {
        if self.max_packet_size > 0 && size > self.max_packet_size {
            return Err(Error::PacketTooLarge {
                size,
                max: self.max_packet_size,
            });
        }
        Ok(())
    }
}

/// Accumulates stream bytes and yields one packet at a time.
///
/// Packets are decoded zero-copy: topic and payload fields share the
/// frame's memory, which is split off the internal buffer.
#[derive(Debug)]
pub struct Framer {
    buf: BytesMut,
    limits: Limits,
    consumed: u64,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Framer {
    pub fn new(limits: Limits) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, limits)
    }

    pub fn with_capacity(capacity: usize, limits: Limits) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            limits,
            consumed: 0,
        }
    }

    /// Append received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered but not yet returned as a packet.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Stream offset of the next packet.
    pub fn position(&self) -> u64 {
        self.consumed
    }

    /// Decode the next complete packet.
    ///
    /// `Ok(None)` means more bytes are needed. Errors are not recoverable:
    /// the stream cannot be resynchronised after a malformed packet.
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        // Fails once a fifth length byte is buffered
        let Some(total) = packet_len(&self.buf)? else {
            return Ok(None);
        };
        self.limits.check(total)?;

        let (len, _) = detect_packet(&self.buf);
        if len == 0 {
            return Ok(None);
        }

        let frame = self.buf.split_to(len).freeze();
        let (packet, _) = Packet::decode_shared(&frame)?;
        trace!(
            "framed {} at offset {} ({} bytes)",
            packet.packet_type(),
            self.consumed,
            len
        );
        self.consumed += len as u64;
        Ok(Some(packet))
    }
}

/// Fuzzing entry point: detect and decode `data`, reporting whether it held
/// a valid packet. Never panics.
pub fn fuzz_decode(data: &[u8]) -> bool {
    if data.is_empty() {
        return true;
    }

    // Incomplete buffers are decoded anyway to exercise truncation paths
    let (_, packet_type) = detect_packet(data);
    let Some(packet_type) = packet_type else {
        return false;
    };

    match Packet::decode(data) {
        Ok((packet, _)) => packet.packet_type() == packet_type,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Puback, Publish};
    use crate::PacketType;

    #[test]
    fn test_byte_at_a_time() {
        let stream = [0x40, 2, 0, 9, 0xD0, 0];
        let mut framer = Framer::default();
        let mut packets = Vec::new();
        for b in stream {
            framer.extend(&[b]);
            while let Some(packet) = framer.next_packet().unwrap() {
                packets.push(packet);
            }
        }
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], Packet::Puback(Puback { packet_id: 9 }));
        assert_eq!(packets[1].packet_type(), PacketType::Pingresp);
        assert_eq!(framer.buffered(), 0);
        assert_eq!(framer.position(), 6);
    }

    #[test]
    fn test_partial_packet_stays_buffered() {
        let mut framer = Framer::default();
        framer.extend(&[0x30, 5, 0, 1]);
        assert_eq!(framer.next_packet(), Ok(None));
        assert_eq!(framer.buffered(), 4);
        framer.extend(&[b't', b'h', b'i']);
        let Some(Packet::Publish(publish)) = framer.next_packet().unwrap() else {
            panic!("expected PUBLISH");
        };
        assert_eq!(publish, Publish::new("t", "hi"));
    }

    #[test]
    fn test_packet_too_large_rejected_before_buffering() {
        let mut framer = Framer::new(Limits { max_packet_size: 64 });
        // announces 200 bytes of payload
        framer.extend(&[0x30, 0xC8, 0x01]);
        assert_eq!(
            framer.next_packet(),
            Err(Error::PacketTooLarge { size: 203, max: 64 })
        );
    }

    #[test]
    fn test_unlimited() {
        assert!(Limits::unlimited().check(MAX_PACKET_SIZE).is_ok());
        assert!(Limits::default().check(1024 * 1024).is_ok());
        assert!(Limits::default().check(1024 * 1024 + 1).is_err());
    }

    #[test]
    fn test_malformed_length() {
        let mut framer = Framer::default();
        framer.extend(&[0x30, 0x80, 0x80, 0x80, 0x80]);
        assert_eq!(framer.next_packet(), Ok(None));
        framer.extend(&[0x01]);
        assert_eq!(framer.next_packet(), Err(Error::InvalidRemainingLength));
    }

    #[test]
    fn test_invalid_packet_surfaces_error() {
        let mut framer = Framer::default();
        framer.extend(&[0x20, 2, 0x02, 0]);
        assert!(matches!(
            framer.next_packet(),
            Err(Error::ReservedBits { .. })
        ));
    }

    #[test]
    fn test_fuzz_decode() {
        assert!(fuzz_decode(&[]));
        assert!(fuzz_decode(&[0xC0, 0]));
        assert!(!fuzz_decode(&[0xF0, 0]));
        assert!(!fuzz_decode(&[0x30]));
        assert!(!fuzz_decode(&[0x30, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]));
    }
}
