//! SUBSCRIBE and its acknowledgment SUBACK.

use std::fmt;

use super::{decode_variant, PacketType};
use crate::codec::{lp_len, Decoder, Encoder, QoS, QOS_FAILURE};
use crate::error::{Error, Result};
use crate::header::{header_len, FixedHeader};

/// One requested subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub filter: String,
    pub qos: QoS,
}

impl Subscription {
    pub fn new(filter: impl Into<String>, qos: QoS) -> Self {
        Self {
            filter: filter.into(),
            qos,
        }
    }
}

/// SUBSCRIBE packet data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subscribe {
    pub packet_id: u16,
    pub subscriptions: Vec<Subscription>,
}

impl Subscribe {
    pub const PACKET_TYPE: PacketType = PacketType::Subscribe;

    fn remaining_length(&self) -> usize {
        2 + self
            .subscriptions
            .iter()
            .map(|s| lp_len(s.filter.as_bytes()) + 1)
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
        let packet_id = dec.read_u16("SUBSCRIBE packet id")?;

        let mut subscriptions = Vec::new();
        while dec.remaining() > 0 {
            let filter = dec.read_string("SUBSCRIBE topic filter")?;
            if filter.is_empty() {
                return Err(Error::EmptyTopic(Self::PACKET_TYPE));
            }

            let options = dec.read_u8("SUBSCRIBE requested QoS")?;
            // MQTT-3.8.3-4: upper six bits of the requested QoS byte are reserved
            if options & 0xFC != 0 {
                return Err(Error::ReservedBits {
                    context: "SUBSCRIBE requested QoS",
                    value: options,
                });
            }
            let qos = QoS::parse(options, "SUBSCRIBE requested QoS")?;

            subscriptions.push(Subscription { filter, qos });
        }

        // MQTT-3.8.3-3: at least one topic filter
        if subscriptions.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }

        Ok(Self {
            packet_id,
            subscriptions,
        })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        if self.subscriptions.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }
        if self.subscriptions.iter().any(|s| s.filter.is_empty()) {
            return Err(Error::EmptyTopic(Self::PACKET_TYPE));
        }

        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, 0x02, self.remaining_length()).write(&mut enc)?;
        enc.write_u16(self.packet_id)?;
        for sub in &self.subscriptions {
            enc.write_string(&sub.filter, "SUBSCRIBE topic filter")?;
            enc.write_u8(sub.qos as u8)?;
        }
        Ok(enc.position())
    }
}

impl fmt::Display for Subscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUBSCRIBE: PacketID={} Subscriptions=[", self.packet_id)?;
        for (i, sub) in self.subscriptions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}={}", sub.filter, sub.qos as u8)?;
        }
        f.write_str("]")
    }
}

/// Per-subscription result carried by SUBACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubackCode {
    Granted(QoS),
    Failure,
}

impl SubackCode {
    pub fn as_u8(self) -> u8 {
        match self {
            SubackCode::Granted(qos) => qos as u8,
            SubackCode::Failure => QOS_FAILURE,
        }
    }
}

impl TryFrom<u8> for SubackCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            QOS_FAILURE => Ok(SubackCode::Failure),
            0..=2 => Ok(SubackCode::Granted(QoS::parse(value, "SUBACK return code")?)),
            _ => Err(Error::InvalidReturnCode(value)),
        }
    }
}

impl From<QoS> for SubackCode {
    fn from(qos: QoS) -> Self {
        SubackCode::Granted(qos)
    }
}

/// SUBACK packet data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Suback {
    pub packet_id: u16,
    /// One entry per subscription of the acknowledged SUBSCRIBE, in order.
    pub return_codes: Vec<SubackCode>,
}

impl Suback {
    pub const PACKET_TYPE: PacketType = PacketType::Suback;

    fn remaining_length(&self) -> usize {
        2 + self.return_codes.len()
    }

    pub fn encoded_len(&self) -> usize {
        let rl = self.remaining_length();
        header_len(rl) + rl
    }

    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
    }

    pub(crate) fn decode_payload(_: &FixedHeader, dec: &mut Decoder<'_>) -> Result<Self> {
        let packet_id = dec.read_u16("SUBACK packet id")?;
        let codes = dec.read_bytes(dec.remaining(), "SUBACK return codes")?;
        if codes.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }
        let return_codes = codes
            .iter()
            .map(|&code| SubackCode::try_from(code))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            packet_id,
            return_codes,
        })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        if self.return_codes.is_empty() {
            return Err(Error::NoSubscriptions(Self::PACKET_TYPE));
        }

        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, 0, self.remaining_length()).write(&mut enc)?;
        enc.write_u16(self.packet_id)?;
        for code in &self.return_codes {
            enc.write_u8(code.as_u8())?;
        }
        Ok(enc.position())
    }
}

impl fmt::Display for Suback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<u8> = self.return_codes.iter().map(|c| c.as_u8()).collect();
        write!(
            f,
            "SUBACK: PacketID={} ReturnCodes={:?}",
            self.packet_id, codes
        )
    }
}
