//! PUBLISH: transports an application message.
//!
//! ```text
//! flags:   DUP(3) QoS(2..1) RETAIN(0)
//! payload: topic (length-prefixed) [packet id if QoS > 0] message...
//! ```

use std::fmt;

use bytes::Bytes;

use super::{decode_variant, Lossy, PacketType};
use crate::codec::{lp_len, validate_utf8, Decoder, Encoder, QoS};
use crate::error::{Error, Result};
use crate::header::{header_len, FixedHeader};

const FLAG_RETAIN: u8 = 0x01;
const FLAG_DUP: u8 = 0x08;
const QOS_SHIFT: u8 = 1;
const QOS_MASK: u8 = 0x03;

/// PUBLISH packet data.
///
/// `topic` and `payload` are `Bytes`, so a packet decoded with
/// [`Packet::decode_shared`](super::Packet::decode_shared) points into the
/// caller's buffer without copying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Publish {
    pub topic: Bytes,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
    pub dup: bool,
    /// Required for QoS 1/2, must be `None` for QoS 0.
    pub packet_id: Option<u16>,
}

impl Publish {
    pub const PACKET_TYPE: PacketType = PacketType::Publish;

    pub fn new(topic: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            ..Default::default()
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = (self.qos as u8) << QOS_SHIFT;
        if self.dup {
            flags |= FLAG_DUP;
        }
        if self.retain {
            flags |= FLAG_RETAIN;
        }
        flags
    }

    fn remaining_length(&self) -> usize {
        let id_len = if self.qos == QoS::AtMostOnce { 0 } else { 2 };
        lp_len(&self.topic) + id_len + self.payload.len()
    }

    pub fn encoded_len(&self) -> usize {
        let rl = self.remaining_length();
        header_len(rl) + rl
    }

    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
    }

    pub(crate) fn decode_payload(header: &FixedHeader, dec: &mut Decoder<'_>) -> Result<Self> {
        let flags = header.flags;
        let qos = QoS::parse((flags >> QOS_SHIFT) & QOS_MASK, "PUBLISH flags")?;
        check_dup(flags, qos)?;

        let topic = dec.read_lp_bytes("PUBLISH topic")?;
        if topic.is_empty() {
            return Err(Error::EmptyTopic(Self::PACKET_TYPE));
        }
        validate_utf8(topic, "PUBLISH topic")?;
        let topic = dec.to_bytes(topic);

        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            Some(dec.read_u16("PUBLISH packet id")?)
        };

        Ok(Self {
            topic,
            payload: dec.read_rest(),
            qos,
            retain: flags & FLAG_RETAIN != 0,
            dup: flags & FLAG_DUP != 0,
            packet_id,
        })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        if self.topic.is_empty() {
            return Err(Error::EmptyTopic(Self::PACKET_TYPE));
        }
        validate_utf8(&self.topic, "PUBLISH topic")?;
        check_dup(self.flags(), self.qos)?;
        let packet_id = match (self.qos, self.packet_id) {
            (QoS::AtMostOnce, None) => None,
            (QoS::AtMostOnce, Some(_)) => {
                return Err(Error::UnexpectedPacketId(Self::PACKET_TYPE))
            }
            (_, Some(id)) => Some(id),
            (_, None) => return Err(Error::MissingPacketId(Self::PACKET_TYPE)),
        };

        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, self.flags(), self.remaining_length())
            .write(&mut enc)?;
        enc.write_lp_bytes(&self.topic, "PUBLISH topic")?;
        if let Some(id) = packet_id {
            enc.write_u16(id)?;
        }
        enc.write_bytes(&self.payload)?;
        Ok(enc.position())
    }
}

/// MQTT-3.3.1-2: DUP must be 0 for QoS 0 messages.
fn check_dup(flags: u8, qos: QoS) -> Result<()> {
    if flags & FLAG_DUP != 0 && qos == QoS::AtMostOnce {
        return Err(Error::ReservedBits {
            context: "PUBLISH DUP at QoS 0",
            value: flags,
        });
    }
    Ok(())
}

impl fmt::Display for Publish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PUBLISH: Topic={} PacketID={} QOS={} Retained={} Dup={} Payload={}",
            Lossy(&self.topic),
            self.packet_id.unwrap_or(0),
            self.qos as u8,
            self.retain,
            self.dup,
            Lossy(&self.payload)
        )
    }
}
