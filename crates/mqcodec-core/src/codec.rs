//! Shared wire primitives: bounds-checked cursors, length-prefixed fields and QoS.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Largest payload a 16-bit length prefix can describe.
pub const MAX_LP_LEN: usize = u16::MAX as usize;

/// SUBACK return code signalling a rejected subscription.
pub const QOS_FAILURE: u8 = 0x80;

/// Quality of Service levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
#[allow(clippy::enum_variant_names)] // MQTT spec names
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    /// Validate a raw QoS value read from `context`.
    pub fn parse(value: u8, context: &'static str) -> Result<Self> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(Error::InvalidQoS { context, value }),
        }
    }
}

impl TryFrom<u8> for QoS {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        QoS::parse(value, "QoS")
    }
}

/// Encoded size of a length-prefixed field.
#[inline]
pub fn lp_len(field: &[u8]) -> usize {
    2 + field.len()
}

/// Cursor over a packet payload.
///
/// Every read is bounds-checked and reports [`Error::IncompletePacket`]
/// with the name of the field being read. When created over a shared
/// `Bytes` source, byte fields are returned as zero-copy slices of it;
/// otherwise they are copied.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    shared: Option<&'a Bytes>,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            shared: None,
        }
    }

    /// Decoder whose byte fields borrow from `source` (reference-counted).
    ///
    /// `buf` must be a sub-slice of `source`.
    pub(crate) fn shared(buf: &'a [u8], source: &'a Bytes) -> Self {
        Self {
            buf,
            pos: 0,
            shared: Some(source),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        let b = *self.buf.get(self.pos).ok_or(Error::IncompletePacket {
            context,
            needed: 1,
            have: 0,
        })?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u16(&mut self, context: &'static str) -> Result<u16> {
        let bytes = self.read_bytes(2, context)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::IncompletePacket {
                context,
                needed: len,
                have: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read a 16-bit length prefix followed by that many bytes.
    pub fn read_lp_bytes(&mut self, context: &'static str) -> Result<&'a [u8]> {
        let len = self.read_u16(context)? as usize;
        self.read_bytes(len, context)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, context: &'static str) -> Result<String> {
        let bytes = self.read_lp_bytes(context)?;
        Ok(validate_utf8(bytes, context)?.to_owned())
    }

    /// Convert a slice previously read from this decoder into `Bytes`.
    pub(crate) fn to_bytes(&self, slice: &'a [u8]) -> Bytes {
        match self.shared {
            Some(source) => source.slice_ref(slice),
            None => Bytes::copy_from_slice(slice),
        }
    }

    /// Read everything left in the payload.
    pub fn read_rest(&mut self) -> Bytes {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        self.to_bytes(rest)
    }
}

/// Check that `bytes` is UTF-8 without an embedded null character.
pub fn validate_utf8<'b>(bytes: &'b [u8], context: &'static str) -> Result<&'b str> {
    let s = std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { context })?;
    // MQTT-1.5.3-2: UTF-8 string MUST NOT contain null character U+0000
    if s.contains('\0') {
        return Err(Error::MalformedPacket(format!(
            "{context}: string must not contain null character"
        )));
    }
    Ok(s)
}

/// Cursor over a destination buffer.
pub struct Encoder<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Encoder<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes still available in the destination.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.reserve(n)?;
        self.pos += n;
        Ok(())
    }

    /// The unwritten tail of the buffer.
    pub fn tail(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Write a 16-bit length prefix followed by `bytes`.
    pub fn write_lp_bytes(&mut self, bytes: &[u8], field: &'static str) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| Error::FieldTooLarge {
            field,
            len: bytes.len(),
        })?;
        self.write_u16(len)?;
        self.write_bytes(bytes)
    }

    /// Write a length-prefixed UTF-8 string, rejecting what the decoder would.
    pub fn write_string(&mut self, s: &str, field: &'static str) -> Result<()> {
        validate_utf8(s.as_bytes(), field)?;
        self.write_lp_bytes(s.as_bytes(), field)
    }

    fn reserve(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::BufferTooSmall {
                needed: self.pos + n,
                have: self.buf.len(),
            });
        }
        Ok(())
    }
}
