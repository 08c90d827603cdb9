//! UNSUBSCRIBE: removes one or more subscriptions.

use std::fmt;

use super::{decode_variant, PacketType};
use crate::codec::{lp_len, Decoder, Encoder};
use crate::error::{Error, Result};
use crate::header::{header_len, FixedHeader};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unsubscribe {
    pub packet_id: u16,
    pub topics: Vec<String>,
}

impl Unsubscribe {
    pub const PACKET_TYPE: PacketType = PacketType::Unsubscribe;

    fn remaining_length(&self) -> usize {
        2 + self
            .topics
            .iter()
            .map(|t| lp_len(t.as_bytes()))
            .sum::<usize>()
    }

    pub fn encoded_len(&self) -> usize {
        let rl = self.remaining_length();
        header_len(rl) + rl
    }

    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
    }

    pub(crate) fn decode_payload(_: &FixedHeader, dec: &mut Decoder<'_>) -> Result<Self> {
        let packet_id = dec.read_u16("UNSUBSCRIBE packet id")?;

        let mut topics = Vec::new();
        while dec.remaining() > 0 {
            let topic = dec.read_string("UNSUBSCRIBE topic filter")?;
            if topic.is_empty() {
                return Err(Error::EmptyTopic(Self::PACKET_TYPE));
            }
            topics.push(topic);
        }

        // MQTT-3.10.3-2: at least one topic filter
        if topics.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }

        Ok(Self { packet_id, topics })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        if self.topics.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }
        if self.topics.iter().any(String::is_empty) {
            return Err(Error::EmptyTopic(Self::PACKET_TYPE));
        }

        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, 0x02, self.remaining_length()).write(&mut enc)?;
        enc.write_u16(self.packet_id)?;
        for topic in &self.topics {
            enc.write_string(topic, "UNSUBSCRIBE topic filter")?;
        }
        Ok(enc.position())
    }
}

impl fmt::Display for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UNSUBSCRIBE: PacketID={} Topics={:?}",
            self.packet_id, self.topics
        )
    }
}
