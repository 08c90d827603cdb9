//! Packets whose whole payload is a packet identifier.

use std::fmt;

use super::{decode_variant, expect_remaining_length, PacketType};
use crate::codec::{Decoder, Encoder};
use crate::error::Result;
use crate::header::FixedHeader;

const REMAINING_LENGTH: usize = 2;

macro_rules! id_only_packet {
    ($(#[$meta:meta])* $name:ident, $packet_type:ident, $flags:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name {
            pub packet_id: u16,
        }

        impl $name {
            pub const PACKET_TYPE: PacketType = PacketType::$packet_type;

            pub fn new(packet_id: u16) -> Self {
                Self { packet_id }
            }

            pub fn encoded_len(&self) -> usize {
                2 + REMAINING_LENGTH
            }

            pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
                decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
            }

            pub(crate) fn decode_payload(
                header: &FixedHeader,
                dec: &mut Decoder<'_>,
            ) -> Result<Self> {
                expect_remaining_length(header, REMAINING_LENGTH)?;
                let packet_id = dec.read_u16(concat!(stringify!($name), " packet id"))?;
                Ok(Self { packet_id })
            }

            pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
                let mut enc = Encoder::new(dst);
                FixedHeader::new(Self::PACKET_TYPE, $flags, REMAINING_LENGTH).write(&mut enc)?;
                enc.write_u16(self.packet_id)?;
                Ok(enc.position())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: PacketID={}", Self::PACKET_TYPE, self.packet_id)
            }
        }
    };
}

id_only_packet!(
    /// PUBACK: QoS 1 acknowledgment.
    Puback, Puback, 0x00
);
id_only_packet!(
    /// PUBREC: first QoS 2 acknowledgment.
    Pubrec, Pubrec, 0x00
);
id_only_packet!(
    /// PUBREL: QoS 2 release, fixed flags `0b0010`.
    Pubrel, Pubrel, 0x02
);
id_only_packet!(
    /// PUBCOMP: final QoS 2 acknowledgment.
    Pubcomp, Pubcomp, 0x00
);
id_only_packet!(
    /// UNSUBACK: acknowledges an UNSUBSCRIBE.
    Unsuback, Unsuback, 0x00
);
