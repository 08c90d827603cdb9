//! Fixed header codec shared by every packet.
//!
//! ```text
//! +--------+--------+----------------------+
//! | type:4 | flags:4| remaining length 1-4 |
//! +--------+--------+----------------------+
//! ```

use crate::codec::Encoder;
use crate::error::{Error, Result};
use crate::packet::PacketType;
use crate::varint;

/// Byte length of a fixed header announcing `remaining_length`.
#[inline]
pub fn header_len(remaining_length: usize) -> usize {
    1 + varint::encoded_len(remaining_length)
}

/// The {type, flags, remaining length} triple in front of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    pub flags: u8,
    pub remaining_length: usize,
}

impl FixedHeader {
    pub fn new(packet_type: PacketType, flags: u8, remaining_length: usize) -> Self {
        Self {
            packet_type,
            flags,
            remaining_length,
        }
    }

    /// Total encoded size: header plus remaining length.
    pub fn packet_len(&self) -> usize {
        header_len(self.remaining_length) + self.remaining_length
    }

    /// Decode a fixed header from the start of `src`.
    ///
    /// Returns the header and the number of header bytes. Fails unless `src`
    /// also holds the complete remaining length.
    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        let first = peek_first(src)?;
        let packet_type = PacketType::try_from(first >> 4)?;
        Self::decode_typed(src, packet_type, first & 0x0F)
    }

    /// Decode a fixed header that must announce `expected`.
    pub fn decode_expected(src: &[u8], expected: PacketType) -> Result<(Self, usize)> {
        let first = peek_first(src)?;
        let packet_type = PacketType::try_from(first >> 4)?;
        if packet_type != expected {
            return Err(Error::UnexpectedPacketType {
                expected,
                found: packet_type,
            });
        }
        Self::decode_typed(src, packet_type, first & 0x0F)
    }

    fn decode_typed(src: &[u8], packet_type: PacketType, flags: u8) -> Result<(Self, usize)> {
        // MQTT-2.2.2-1: flags other than PUBLISH's are fixed per packet type
        if let Some(required) = packet_type.fixed_flags() {
            if flags != required {
                return Err(Error::ReservedBits {
                    context: packet_type.name(),
                    value: flags,
                });
            }
        }

        let Some((remaining_length, len_bytes)) = varint::decode(&src[1..])? else {
            return Err(Error::IncompletePacket {
                context: "remaining length",
                needed: src.len(),
                have: src.len() - 1,
            });
        };

        let header_len = 1 + len_bytes;
        let available = src.len() - header_len;
        if available < remaining_length {
            return Err(Error::IncompletePacket {
                context: packet_type.name(),
                needed: remaining_length,
                have: available,
            });
        }

        Ok((
            Self {
                packet_type,
                flags,
                remaining_length,
            },
            header_len,
        ))
    }

    /// Encode the header into `dst`, which must be large enough for the whole
    /// packet. Returns the number of header bytes written.
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        let mut enc = Encoder::new(dst);
        self.write(&mut enc)?;
        Ok(enc.position())
    }

    pub(crate) fn write(&self, enc: &mut Encoder<'_>) -> Result<()> {
        if self.remaining_length > varint::MAX_REMAINING_LENGTH {
            return Err(Error::RemainingLengthTooLarge(self.remaining_length));
        }
        let needed = self.packet_len();
        if enc.remaining() < needed {
            return Err(Error::BufferTooSmall {
                needed: enc.position() + needed,
                have: enc.position() + enc.remaining(),
            });
        }

        enc.write_u8(((self.packet_type as u8) << 4) | (self.flags & 0x0F))?;
        let n = varint::encode_to_slice(self.remaining_length, enc.tail())?;
        enc.advance(n)
    }
}

fn peek_first(src: &[u8]) -> Result<u8> {
    if src.len() < 2 {
        return Err(Error::IncompletePacket {
            context: "fixed header",
            needed: 2,
            have: src.len(),
        });
    }
    Ok(src[0])
}
