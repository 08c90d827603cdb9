//! CONNECT: the first packet a client sends.
//!
//! ```text
//! variable header: protocol name, protocol level, connect flags, keep alive
//! payload:         client id [will topic, will message] [username] [password]
//! ```

use std::fmt;

use bytes::Bytes;

use super::{decode_variant, Lossy, PacketType};
use crate::codec::{lp_len, Decoder, Encoder, QoS};
use crate::error::{Error, Result};
use crate::header::{header_len, FixedHeader};

const FLAG_RESERVED: u8 = 0x01;
const FLAG_CLEAN_SESSION: u8 = 0x02;
const FLAG_WILL: u8 = 0x04;
const FLAG_WILL_QOS_SHIFT: u8 = 3;
const FLAG_WILL_QOS_MASK: u8 = 0x18;
const FLAG_WILL_RETAIN: u8 = 0x20;
const FLAG_PASSWORD: u8 = 0x40;
const FLAG_USERNAME: u8 = 0x80;

/// Protocol revisions this codec speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// MQTT 3.1, protocol name "MQIsdp", level 3.
    V31,
    /// MQTT 3.1.1, protocol name "MQTT", level 4.
    #[default]
    V311,
}

impl ProtocolVersion {
    pub fn name(self) -> &'static str {
        match self {
            ProtocolVersion::V31 => "MQIsdp",
            ProtocolVersion::V311 => "MQTT",
        }
    }

    pub fn level(self) -> u8 {
        match self {
            ProtocolVersion::V31 => 3,
            ProtocolVersion::V311 => 4,
        }
    }

    fn parse(name: &str, level: u8) -> Result<Self> {
        let version = match name {
            "MQIsdp" => ProtocolVersion::V31,
            "MQTT" => ProtocolVersion::V311,
            _ => return Err(Error::InvalidProtocolName(name.to_owned())),
        };
        if version.level() != level {
            return Err(Error::UnsupportedProtocolVersion(level));
        }
        Ok(version)
    }
}

/// Last Will and Testament.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Will {
    pub topic: String,
    pub message: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

/// CONNECT packet data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Connect {
    pub protocol_version: ProtocolVersion,
    pub clean_session: bool,
    /// Keep-alive interval in seconds, 0 disables it.
    pub keep_alive: u16,
    pub client_id: String,
    pub will: Option<Will>,
    pub username: Option<String>,
    pub password: Option<Bytes>,
}

impl Connect {
    pub const PACKET_TYPE: PacketType = PacketType::Connect;

    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            clean_session: true,
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.clean_session {
            flags |= FLAG_CLEAN_SESSION;
        }
        if let Some(will) = &self.will {
            flags |= FLAG_WILL;
            flags |= (will.qos as u8) << FLAG_WILL_QOS_SHIFT;
            if will.retain {
                flags |= FLAG_WILL_RETAIN;
            }
        }
        if self.username.is_some() {
            flags |= FLAG_USERNAME;
        }
        if self.password.is_some() {
            flags |= FLAG_PASSWORD;
        }
        flags
    }

    fn remaining_length(&self) -> usize {
        // protocol name + level + flags + keep alive
        let mut len = lp_len(self.protocol_version.name().as_bytes()) + 1 + 1 + 2;
        len += lp_len(self.client_id.as_bytes());
        if let Some(will) = &self.will {
            len += lp_len(will.topic.as_bytes()) + lp_len(&will.message);
        }
        if let Some(username) = &self.username {
            len += lp_len(username.as_bytes());
        }
        if let Some(password) = &self.password {
            len += lp_len(password);
        }
        len
    }

    pub fn encoded_len(&self) -> usize {
        let rl = self.remaining_length();
        header_len(rl) + rl
    }

    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
    }

    pub(crate) fn decode_payload(_: &FixedHeader, dec: &mut Decoder<'_>) -> Result<Self> {
        let name = dec.read_string("CONNECT protocol name")?;
        let level = dec.read_u8("CONNECT protocol level")?;
        let protocol_version = ProtocolVersion::parse(&name, level)?;

        let flags = dec.read_u8("CONNECT flags")?;
        check_flags(flags)?;
        let keep_alive = dec.read_u16("CONNECT keep alive")?;

        let clean_session = flags & FLAG_CLEAN_SESSION != 0;
        let client_id = dec.read_string("CONNECT client id")?;
        // MQTT-3.1.3-7: a zero-byte client id needs a clean session
        if client_id.is_empty() && !clean_session {
            return Err(Error::InvalidConnectFlags {
                flags,
                reason: "zero-length client id requires clean session",
            });
        }

        let will = if flags & FLAG_WILL != 0 {
            let topic = dec.read_string("CONNECT will topic")?;
            if topic.is_empty() {
                return Err(Error::EmptyTopic(Self::PACKET_TYPE));
            }
            let message = dec.read_lp_bytes("CONNECT will message")?;
            Some(Will {
                topic,
                message: dec.to_bytes(message),
                qos: QoS::parse(
                    (flags & FLAG_WILL_QOS_MASK) >> FLAG_WILL_QOS_SHIFT,
                    "CONNECT will QoS",
                )?,
                retain: flags & FLAG_WILL_RETAIN != 0,
            })
        } else {
            None
        };

        let username = if flags & FLAG_USERNAME != 0 {
            Some(dec.read_string("CONNECT username")?)
        } else {
            None
        };

        let password = if flags & FLAG_PASSWORD != 0 {
            let password = dec.read_lp_bytes("CONNECT password")?;
            Some(dec.to_bytes(password))
        } else {
            None
        };

        Ok(Self {
            protocol_version,
            clean_session,
            keep_alive,
            client_id,
            will,
            username,
            password,
        })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        let flags = self.flags();
        check_flags(flags)?;
        if self.client_id.is_empty() && !self.clean_session {
            return Err(Error::InvalidConnectFlags {
                flags,
                reason: "zero-length client id requires clean session",
            });
        }
        if self.will.as_ref().is_some_and(|w| w.topic.is_empty()) {
            return Err(Error::EmptyTopic(Self::PACKET_TYPE));
        }

        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, 0, self.remaining_length()).write(&mut enc)?;

        enc.write_lp_bytes(self.protocol_version.name().as_bytes(), "CONNECT protocol name")?;
        enc.write_u8(self.protocol_version.level())?;
        enc.write_u8(flags)?;
        enc.write_u16(self.keep_alive)?;

        enc.write_string(&self.client_id, "CONNECT client id")?;
        if let Some(will) = &self.will {
            enc.write_string(&will.topic, "CONNECT will topic")?;
            enc.write_lp_bytes(&will.message, "CONNECT will message")?;
        }
        if let Some(username) = &self.username {
            enc.write_string(username, "CONNECT username")?;
        }
        if let Some(password) = &self.password {
            enc.write_lp_bytes(password, "CONNECT password")?;
        }
        Ok(enc.position())
    }
}

/// Legality rules for the connect flags byte.
fn check_flags(flags: u8) -> Result<()> {
    // MQTT-3.1.2-3: reserved flag must be zero
    if flags & FLAG_RESERVED != 0 {
        return Err(Error::ReservedBits {
            context: "CONNECT flags",
            value: flags,
        });
    }

    if flags & FLAG_WILL == 0 {
        // MQTT-3.1.2-11, MQTT-3.1.2-13, MQTT-3.1.2-15
        if flags & (FLAG_WILL_QOS_MASK | FLAG_WILL_RETAIN) != 0 {
            return Err(Error::InvalidConnectFlags {
                flags,
                reason: "will QoS and retain must be zero without a will",
            });
        }
    } else {
        QoS::parse(
            (flags & FLAG_WILL_QOS_MASK) >> FLAG_WILL_QOS_SHIFT,
            "CONNECT will QoS",
        )?;
    }

    // MQTT-3.1.2-22
    if flags & FLAG_PASSWORD != 0 && flags & FLAG_USERNAME == 0 {
        return Err(Error::InvalidConnectFlags {
            flags,
            reason: "password flag set without username flag",
        });
    }
    Ok(())
}

impl fmt::Display for Connect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CONNECT: Protocol={:?} Level={} ClientID={:?} KeepAlive={} CleanSession={}",
            self.protocol_version.name(),
            self.protocol_version.level(),
            self.client_id,
            self.keep_alive,
            self.clean_session
        )?;
        if let Some(username) = &self.username {
            write!(f, " Username={username:?}")?;
        }
        if self.password.is_some() {
            f.write_str(" Password=<redacted>")?;
        }
        if let Some(will) = &self.will {
            write!(
                f,
                " WillTopic={:?} WillPayload={} WillQOS={} WillRetain={}",
                will.topic,
                Lossy(&will.message),
                will.qos as u8,
                will.retain
            )?;
        }
        Ok(())
    }
}
