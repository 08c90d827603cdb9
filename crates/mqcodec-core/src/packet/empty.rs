//! PINGREQ, PINGRESP and DISCONNECT: a fixed header with nothing after it.

use std::fmt;

use super::{decode_variant, expect_remaining_length, PacketType};
use crate::codec::{Decoder, Encoder};
use crate::error::Result;
use crate::header::FixedHeader;

macro_rules! header_only_packet {
    ($(#[$meta:meta])* $name:ident, $packet_type:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name;

        impl $name {
            pub const PACKET_TYPE: PacketType = PacketType::$packet_type;

            pub fn encoded_len(&self) -> usize {
                2
            }

            pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
                decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
            }

            pub(crate) fn decode_payload(header: &FixedHeader, _: &mut Decoder<'_>) -> Result<Self> {
                expect_remaining_length(header, 0)?;
                Ok(Self)
            }

            pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
                let mut enc = Encoder::new(dst);
                FixedHeader::new(Self::PACKET_TYPE, 0, 0).write(&mut enc)?;
                Ok(enc.position())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&Self::PACKET_TYPE, f)
            }
        }
    };
}

header_only_packet!(
    /// PINGREQ: client keep-alive probe.
    Pingreq, Pingreq
);
header_only_packet!(
    /// PINGRESP: answer to PINGREQ.
    Pingresp, Pingresp
);
header_only_packet!(
    /// DISCONNECT: clean client shutdown.
    Disconnect, Disconnect
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_encode() {
        let mut buf = [0xFFu8; 2];
        assert_eq!(Pingreq.encode(&mut buf).unwrap(), 2);
        assert_eq!(buf, [0xC0, 0]);
        Pingresp.encode(&mut buf).unwrap();
        assert_eq!(buf, [0xD0, 0]);
        Disconnect.encode(&mut buf).unwrap();
        assert_eq!(buf, [0xE0, 0]);
    }

    #[test]
    fn test_decode() {
        assert_eq!(Pingreq::decode(&[0xC0, 0, 0xAA]).unwrap(), (Pingreq, 2));
        assert_eq!(Disconnect::decode(&[0xE0, 0]).unwrap(), (Disconnect, 2));
    }

    #[test]
    fn test_nonzero_remaining_length() {
        assert_eq!(
            Disconnect::decode(&[0xE0, 1, 0]),
            Err(Error::RemainingLengthMismatch {
                packet: PacketType::Disconnect,
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn test_reserved_flags() {
        assert!(matches!(
            Pingresp::decode(&[0xD8, 0]),
            Err(Error::ReservedBits { .. })
        ));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 1];
        assert!(matches!(
            Pingreq.encode(&mut buf),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Pingreq.to_string(), "PINGREQ");
        assert_eq!(Disconnect.encoded_len(), 2);
    }
}
