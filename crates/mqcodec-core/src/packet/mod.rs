//! MQTT 3.1/3.1.1 control packets.
//!
//! Each packet kind is its own struct with `decode`/`encode`/`encoded_len`.
//! [`Packet`] is the closed union over all of them and is what stream
//! decoders hand to the broker or client layer.

mod ack;
mod connack;
mod connect;
mod empty;
mod publish;
mod subscribe;
mod unsubscribe;

use std::fmt;

use bytes::Bytes;

use crate::codec::Decoder;
use crate::error::{Error, Result};
use crate::header::FixedHeader;

pub use ack::{Puback, Pubcomp, Pubrec, Pubrel, Unsuback};
pub use connack::{Connack, ConnackCode};
pub use connect::{Connect, ProtocolVersion, Will};
pub use empty::{Disconnect, Pingreq, Pingresp};
pub use publish::Publish;
pub use subscribe::{Suback, SubackCode, Subscribe, Subscription};
pub use unsubscribe::Unsubscribe;

/// MQTT Control Packet Types (4 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl PacketType {
    /// Protocol name of the packet type.
    pub const fn name(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::Connack => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::Puback => "PUBACK",
            PacketType::Pubrec => "PUBREC",
            PacketType::Pubrel => "PUBREL",
            PacketType::Pubcomp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::Suback => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::Unsuback => "UNSUBACK",
            PacketType::Pingreq => "PINGREQ",
            PacketType::Pingresp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
        }
    }

    /// The flag nibble this type must carry, or `None` for PUBLISH whose
    /// flags carry DUP/QoS/RETAIN.
    pub const fn fixed_flags(self) -> Option<u8> {
        match self {
            PacketType::Publish => None,
            PacketType::Pubrel | PacketType::Subscribe | PacketType::Unsubscribe => Some(0x02),
            _ => Some(0x00),
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::Connack),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::Puback),
            5 => Ok(PacketType::Pubrec),
            6 => Ok(PacketType::Pubrel),
            7 => Ok(PacketType::Pubcomp),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::Suback),
            10 => Ok(PacketType::Unsubscribe),
            11 => Ok(PacketType::Unsuback),
            12 => Ok(PacketType::Pingreq),
            13 => Ok(PacketType::Pingresp),
            14 => Ok(PacketType::Disconnect),
            _ => Err(Error::InvalidPacketType(value)),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// MQTT Packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Connect(Connect),
    Connack(Connack),
    Publish(Publish),
    Puback(Puback),
    Pubrec(Pubrec),
    Pubrel(Pubrel),
    Pubcomp(Pubcomp),
    Subscribe(Subscribe),
    Suback(Suback),
    Unsubscribe(Unsubscribe),
    Unsuback(Unsuback),
    Pingreq(Pingreq),
    Pingresp(Pingresp),
    Disconnect(Disconnect),
}

impl Packet {
    /// Zero-initialized packet of the given type.
    pub fn empty(packet_type: PacketType) -> Packet {
        match packet_type {
            PacketType::Connect => Packet::Connect(Connect::default()),
            PacketType::Connack => Packet::Connack(Connack::default()),
            PacketType::Publish => Packet::Publish(Publish::default()),
            PacketType::Puback => Packet::Puback(Puback::default()),
            PacketType::Pubrec => Packet::Pubrec(Pubrec::default()),
            PacketType::Pubrel => Packet::Pubrel(Pubrel::default()),
            PacketType::Pubcomp => Packet::Pubcomp(Pubcomp::default()),
            PacketType::Subscribe => Packet::Subscribe(Subscribe::default()),
            PacketType::Suback => Packet::Suback(Suback::default()),
            PacketType::Unsubscribe => Packet::Unsubscribe(Unsubscribe::default()),
            PacketType::Unsuback => Packet::Unsuback(Unsuback::default()),
            PacketType::Pingreq => Packet::Pingreq(Pingreq),
            PacketType::Pingresp => Packet::Pingresp(Pingresp),
            PacketType::Disconnect => Packet::Disconnect(Disconnect),
        }
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::Connack(_) => PacketType::Connack,
            Packet::Publish(_) => PacketType::Publish,
            Packet::Puback(_) => PacketType::Puback,
            Packet::Pubrec(_) => PacketType::Pubrec,
            Packet::Pubrel(_) => PacketType::Pubrel,
            Packet::Pubcomp(_) => PacketType::Pubcomp,
            Packet::Subscribe(_) => PacketType::Subscribe,
            Packet::Suback(_) => PacketType::Suback,
            Packet::Unsubscribe(_) => PacketType::Unsubscribe,
            Packet::Unsuback(_) => PacketType::Unsuback,
            Packet::Pingreq(_) => PacketType::Pingreq,
            Packet::Pingresp(_) => PacketType::Pingresp,
            Packet::Disconnect(_) => PacketType::Disconnect,
        }
    }

    /// Packet identifier, for the kinds that carry one.
    ///
    /// PUBLISH only reports an identifier when its QoS is above 0.
    pub fn packet_id(&self) -> Option<u16> {
        match self {
            Packet::Publish(p) => p.packet_id.filter(|_| p.qos != crate::QoS::AtMostOnce),
            Packet::Puback(p) => Some(p.packet_id),
            Packet::Pubrec(p) => Some(p.packet_id),
            Packet::Pubrel(p) => Some(p.packet_id),
            Packet::Pubcomp(p) => Some(p.packet_id),
            Packet::Subscribe(p) => Some(p.packet_id),
            Packet::Suback(p) => Some(p.packet_id),
            Packet::Unsubscribe(p) => Some(p.packet_id),
            Packet::Unsuback(p) => Some(p.packet_id),
            Packet::Connect(_)
            | Packet::Connack(_)
            | Packet::Pingreq(_)
            | Packet::Pingresp(_)
            | Packet::Disconnect(_) => None,
        }
    }

    /// Byte length of the encoded packet.
    pub fn encoded_len(&self) -> usize {
        match self {
            Packet::Connect(p) => p.encoded_len(),
            Packet::Connack(p) => p.encoded_len(),
            Packet::Publish(p) => p.encoded_len(),
            Packet::Puback(p) => p.encoded_len(),
            Packet::Pubrec(p) => p.encoded_len(),
            Packet::Pubrel(p) => p.encoded_len(),
            Packet::Pubcomp(p) => p.encoded_len(),
            Packet::Subscribe(p) => p.encoded_len(),
            Packet::Suback(p) => p.encoded_len(),
            Packet::Unsubscribe(p) => p.encoded_len(),
            Packet::Unsuback(p) => p.encoded_len(),
            Packet::Pingreq(p) => p.encoded_len(),
            Packet::Pingresp(p) => p.encoded_len(),
            Packet::Disconnect(p) => p.encoded_len(),
        }
    }

    /// Encode into `dst`. Returns the number of bytes written.
    ///
    /// On error the contents of `dst` are unspecified.
    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        match self {
            Packet::Connect(p) => p.encode(dst),
            Packet::Connack(p) => p.encode(dst),
            Packet::Publish(p) => p.encode(dst),
            Packet::Puback(p) => p.encode(dst),
            Packet::Pubrec(p) => p.encode(dst),
            Packet::Pubrel(p) => p.encode(dst),
            Packet::Pubcomp(p) => p.encode(dst),
            Packet::Subscribe(p) => p.encode(dst),
            Packet::Suback(p) => p.encode(dst),
            Packet::Unsubscribe(p) => p.encode(dst),
            Packet::Unsuback(p) => p.encode(dst),
            Packet::Pingreq(p) => p.encode(dst),
            Packet::Pingresp(p) => p.encode(dst),
            Packet::Disconnect(p) => p.encode(dst),
        }
    }

    /// Encode into a freshly allocated buffer of exactly `encoded_len()` bytes.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()];
        let n = self.encode(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Decode the packet at the start of `src`, copying variable-length fields.
    ///
    /// Returns the packet and the number of bytes consumed.
    pub fn decode(src: &[u8]) -> Result<(Packet, usize)> {
        decode_packet(src, None)
    }

    /// Decode the packet at the start of `src` without copying topic,
    /// payload and other byte fields; they are reference-counted slices of
    /// `src`.
    pub fn decode_shared(src: &Bytes) -> Result<(Packet, usize)> {
        decode_packet(src, Some(src))
    }
}

fn decode_packet(src: &[u8], shared: Option<&Bytes>) -> Result<(Packet, usize)> {
    let (header, header_len) = FixedHeader::decode(src)?;
    let total = header_len + header.remaining_length;
    let payload = &src[header_len..total];
    let mut dec = match shared {
        Some(source) => Decoder::shared(payload, source),
        None => Decoder::new(payload),
    };

    let packet = match header.packet_type {
        PacketType::Connect => Packet::Connect(Connect::decode_payload(&header, &mut dec)?),
        PacketType::Connack => Packet::Connack(Connack::decode_payload(&header, &mut dec)?),
        PacketType::Publish => Packet::Publish(Publish::decode_payload(&header, &mut dec)?),
        PacketType::Puback => Packet::Puback(Puback::decode_payload(&header, &mut dec)?),
        PacketType::Pubrec => Packet::Pubrec(Pubrec::decode_payload(&header, &mut dec)?),
        PacketType::Pubrel => Packet::Pubrel(Pubrel::decode_payload(&header, &mut dec)?),
        PacketType::Pubcomp => Packet::Pubcomp(Pubcomp::decode_payload(&header, &mut dec)?),
        PacketType::Subscribe => {
            Packet::Subscribe(Subscribe::decode_payload(&header, &mut dec)?)
        }
        PacketType::Suback => Packet::Suback(Suback::decode_payload(&header, &mut dec)?),
        PacketType::Unsubscribe => {
            Packet::Unsubscribe(Unsubscribe::decode_payload(&header, &mut dec)?)
        }
        PacketType::Unsuback => Packet::Unsuback(Unsuback::decode_payload(&header, &mut dec)?),
        PacketType::Pingreq => Packet::Pingreq(Pingreq::decode_payload(&header, &mut dec)?),
        PacketType::Pingresp => Packet::Pingresp(Pingresp::decode_payload(&header, &mut dec)?),
        PacketType::Disconnect => {
            Packet::Disconnect(Disconnect::decode_payload(&header, &mut dec)?)
        }
    };

    ensure_consumed(&header, &dec)?;
    Ok((packet, total))
}

/// Decode a single packet kind from `src`, shared by the per-variant
/// `decode` functions.
pub(crate) fn decode_variant<T>(
    src: &[u8],
    expected: PacketType,
    decode_payload: impl FnOnce(&FixedHeader, &mut Decoder<'_>) -> Result<T>,
) -> Result<(T, usize)> {
    let (header, header_len) = FixedHeader::decode_expected(src, expected)?;
    let total = header_len + header.remaining_length;
    let mut dec = Decoder::new(&src[header_len..total]);
    let packet = decode_payload(&header, &mut dec)?;
    ensure_consumed(&header, &dec)?;
    Ok((packet, total))
}

/// Reject payload bytes the packet layout did not account for.
fn ensure_consumed(header: &FixedHeader, dec: &Decoder<'_>) -> Result<()> {
    if dec.remaining() != 0 {
        return Err(Error::RemainingLengthMismatch {
            packet: header.packet_type,
            expected: dec.position(),
            actual: header.remaining_length,
        });
    }
    Ok(())
}

/// Fail with [`Error::RemainingLengthMismatch`] unless the header announces
/// exactly `expected` bytes.
pub(crate) fn expect_remaining_length(header: &FixedHeader, expected: usize) -> Result<()> {
    if header.remaining_length != expected {
        return Err(Error::RemainingLengthMismatch {
            packet: header.packet_type,
            expected,
            actual: header.remaining_length,
        });
    }
    Ok(())
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packet::Connect(p) => fmt::Display::fmt(p, f),
            Packet::Connack(p) => fmt::Display::fmt(p, f),
            Packet::Publish(p) => fmt::Display::fmt(p, f),
            Packet::Puback(p) => fmt::Display::fmt(p, f),
            Packet::Pubrec(p) => fmt::Display::fmt(p, f),
            Packet::Pubrel(p) => fmt::Display::fmt(p, f),
            Packet::Pubcomp(p) => fmt::Display::fmt(p, f),
            Packet::Subscribe(p) => fmt::Display::fmt(p, f),
            Packet::Suback(p) => fmt::Display::fmt(p, f),
            Packet::Unsubscribe(p) => fmt::Display::fmt(p, f),
            Packet::Unsuback(p) => fmt::Display::fmt(p, f),
            Packet::Pingreq(p) => fmt::Display::fmt(p, f),
            Packet::Pingresp(p) => fmt::Display::fmt(p, f),
            Packet::Disconnect(p) => fmt::Display::fmt(p, f),
        }
    }
}

/// Formats binary fields as a quoted string when printable, bytes otherwise.
pub(crate) struct Lossy<'a>(pub &'a [u8]);

impl fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{s:?}"),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}
