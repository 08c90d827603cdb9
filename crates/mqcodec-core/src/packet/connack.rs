//! CONNACK: the server's answer to CONNECT.

use std::fmt;

use super::{decode_variant, expect_remaining_length, PacketType};
use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};
use crate::header::{header_len, FixedHeader};

/// CONNACK return codes (MQTT 3.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ConnackCode {
    #[default]
    Accepted = 0,
    UnacceptableProtocolVersion = 1,
    IdentifierRejected = 2,
    ServerUnavailable = 3,
    BadUsernamePassword = 4,
    NotAuthorized = 5,
}

impl ConnackCode {
    pub fn description(self) -> &'static str {
        match self {
            ConnackCode::Accepted => "Connection accepted",
            ConnackCode::UnacceptableProtocolVersion => {
                "Connection Refused, unacceptable protocol version"
            }
            ConnackCode::IdentifierRejected => "Connection Refused, identifier rejected",
            ConnackCode::ServerUnavailable => "Connection Refused, Server unavailable",
            ConnackCode::BadUsernamePassword => "Connection Refused, bad user name or password",
            ConnackCode::NotAuthorized => "Connection Refused, not authorized",
        }
    }
}

impl TryFrom<u8> for ConnackCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ConnackCode::Accepted),
            1 => Ok(ConnackCode::UnacceptableProtocolVersion),
            2 => Ok(ConnackCode::IdentifierRejected),
            3 => Ok(ConnackCode::ServerUnavailable),
            4 => Ok(ConnackCode::BadUsernamePassword),
            5 => Ok(ConnackCode::NotAuthorized),
            _ => Err(Error::InvalidConnackCode(value)),
        }
    }
}

impl fmt::Display for ConnackCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// CONNACK packet data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Connack {
    /// Whether the server already holds session state for the client.
    pub session_present: bool,
    pub code: ConnackCode,
}

impl Connack {
    pub const PACKET_TYPE: PacketType = PacketType::Connack;

    const REMAINING_LENGTH: usize = 2;

    pub fn encoded_len(&self) -> usize {
        header_len(Self::REMAINING_LENGTH) + Self::REMAINING_LENGTH
    }

    pub fn decode(src: &[u8]) -> Result<(Self, usize)> {
        decode_variant(src, Self::PACKET_TYPE, Self::decode_payload)
    }

    pub(crate) fn decode_payload(header: &FixedHeader, dec: &mut Decoder<'_>) -> Result<Self> {
        expect_remaining_length(header, Self::REMAINING_LENGTH)?;

        let ack_flags = dec.read_u8("CONNACK flags")?;
        // MQTT-3.2.2-1: bits 7-1 of the acknowledge flags are reserved
        if ack_flags & 0xFE != 0 {
            return Err(Error::ReservedBits {
                context: "CONNACK acknowledge flags",
                value: ack_flags,
            });
        }

        let code = ConnackCode::try_from(dec.read_u8("CONNACK return code")?)?;

        Ok(Self {
            session_present: ack_flags & 0x01 != 0,
            code,
        })
    }

    pub fn encode(&self, dst: &mut [u8]) -> Result<usize> {
        let mut enc = Encoder::new(dst);
        FixedHeader::new(Self::PACKET_TYPE, 0, Self::REMAINING_LENGTH).write(&mut enc)?;
        enc.write_u8(u8::from(self.session_present))?;
        enc.write_u8(self.code as u8)?;
        Ok(enc.position())
    }
}

impl fmt::Display for Connack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CONNACK: SessionPresent={} ReturnCode={:?}",
            self.session_present,
            self.code.description()
        )
    }
}
