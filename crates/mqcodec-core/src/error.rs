//! Error types for mqcodec.

use thiserror::Error;

use crate::packet::PacketType;

/// Coarse classification of codec errors.
///
/// Transport layers usually only need to know which class of violation
/// occurred (to pick a CONNACK code or close the connection), not the exact
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer is shorter than a field requires.
    Truncated,
    /// The remaining length disagrees with the bytes the payload layout consumed.
    LengthMismatch,
    /// A QoS, return code, protocol name/level or flag combination is not allowed.
    InvalidValue,
    /// Bits required to be zero are set.
    ReservedBits,
    /// A field or packet exceeds its size ceiling.
    Oversized,
    /// The type nibble does not name a supported packet.
    UnknownPacketType,
    /// The destination buffer cannot hold the encoded packet.
    BufferTooSmall,
}

/// MQTT codec errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{context}: incomplete packet: need {needed} bytes, have {have}")]
    IncompletePacket {
        context: &'static str,
        needed: usize,
        have: usize,
    },

    #[error("{packet}: expected remaining length {expected}, got {actual}")]
    RemainingLengthMismatch {
        packet: PacketType,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid remaining length encoding")]
    InvalidRemainingLength,

    #[error("Remaining length {0} exceeds protocol maximum (268435455)")]
    RemainingLengthTooLarge(usize),

    #[error("Invalid packet type: {0}")]
    InvalidPacketType(u8),

    #[error("Unexpected packet type: expected {expected}, found {found}")]
    UnexpectedPacketType {
        expected: PacketType,
        found: PacketType,
    },

    #[error("{context}: invalid QoS {value}")]
    InvalidQoS { context: &'static str, value: u8 },

    #[error("Invalid CONNACK return code: {0}")]
    InvalidConnackCode(u8),

    #[error("Invalid SUBACK return code: {0:#04x}")]
    InvalidReturnCode(u8),

    #[error("Invalid protocol name: expected 'MQTT' or 'MQIsdp', got '{0}'")]
    InvalidProtocolName(String),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(u8),

    #[error("{context}: reserved bits are set ({value:#04x})")]
    ReservedBits { context: &'static str, value: u8 },

    #[error("Invalid connect flags {flags:#04x}: {reason}")]
    InvalidConnectFlags { flags: u8, reason: &'static str },

    #[error("{context}: invalid UTF-8 string")]
    InvalidUtf8 { context: &'static str },

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("{field} too large: {len} bytes (max 65535)")]
    FieldTooLarge { field: &'static str, len: usize },

    #[error("{0}: packet identifier required")]
    MissingPacketId(PacketType),

    #[error("{0}: packet identifier not allowed at QoS 0")]
    UnexpectedPacketId(PacketType),

    #[error("{0}: topic must not be empty")]
    EmptyTopic(PacketType),

    #[error("{0}: at least one topic filter is required")]
    NoSubscriptions(PacketType),

    #[error("Buffer too small: need {needed} bytes, have {have}")]
    BufferTooSmall { needed: usize, have: usize },

    #[error("Packet too large: {size} bytes (max {max})")]
    PacketTooLarge { size: usize, max: usize },
}

impl Error {
    /// Returns the class of violation this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IncompletePacket { .. } => ErrorKind::Truncated,
            Error::RemainingLengthMismatch { .. } | Error::InvalidRemainingLength => {
                ErrorKind::LengthMismatch
            }
            Error::InvalidQoS { .. }
            | Error::InvalidConnackCode(_)
            | Error::InvalidReturnCode(_)
            | Error::InvalidProtocolName(_)
            | Error::UnsupportedProtocolVersion(_)
            | Error::InvalidConnectFlags { .. }
            | Error::InvalidUtf8 { .. }
            | Error::MalformedPacket(_)
            | Error::MissingPacketId(_)
            | Error::UnexpectedPacketId(_)
            | Error::EmptyTopic(_)
            | Error::NoSubscriptions(_) => ErrorKind::InvalidValue,
            Error::ReservedBits { .. } => ErrorKind::ReservedBits,
            Error::FieldTooLarge { .. }
            | Error::RemainingLengthTooLarge(_)
            | Error::PacketTooLarge { .. } => ErrorKind::Oversized,
            Error::InvalidPacketType(_) | Error::UnexpectedPacketType { .. } => {
                ErrorKind::UnknownPacketType
            }
            Error::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = Error::IncompletePacket {
            context: "PUBLISH topic",
            needed: 7,
            have: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("PUBLISH topic"));
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn test_display_packet_type() {
        let err = Error::RemainingLengthMismatch {
            packet: PacketType::Connack,
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "CONNACK: expected remaining length 2, got 3"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Error::BufferTooSmall { needed: 4, have: 1 }.kind(),
            ErrorKind::BufferTooSmall
        );
        assert_eq!(Error::InvalidPacketType(0).kind(), ErrorKind::UnknownPacketType);
        assert_eq!(
            Error::FieldTooLarge {
                field: "topic",
                len: 65536
            }
            .kind(),
            ErrorKind::Oversized
        );
        assert_eq!(
            Error::ReservedBits {
                context: "CONNACK flags",
                value: 0x02
            }
            .kind(),
            ErrorKind::ReservedBits
        );
        assert_eq!(Error::InvalidConnackCode(6).kind(), ErrorKind::InvalidValue);
        assert_eq!(
            Error::InvalidRemainingLength.kind(),
            ErrorKind::LengthMismatch
        );
    }
}
