//! Variable Byte Integer encoding/decoding for the MQTT remaining length.
//!
//! The encoding uses 7 bits per byte for the value, with the high bit
//! indicating whether more bytes follow. At most four bytes are allowed:
//! - 0-127: 1 byte
//! - 128-16383: 2 bytes
//! - 16384-2097151: 3 bytes
//! - 2097152-268435455: 4 bytes

use crate::error::{Error, Result};

/// Largest value representable in four bytes.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Maximum number of bytes a remaining length may occupy.
pub const MAX_VARINT_LEN: usize = 4;

/// Decode a variable byte integer from the start of `buf`.
///
/// Returns `Ok(Some((value, bytes_consumed)))` if successful,
/// `Ok(None)` if more data is needed, or `Err` if a fifth byte would be required.
///
/// # Example
/// ```
/// use mqcodec_core::varint::decode;
/// let buf = [0x80, 0x01]; // Encodes 128
/// let (value, consumed) = decode(&buf).unwrap().unwrap();
/// assert_eq!(value, 128);
/// assert_eq!(consumed, 2);
/// ```
pub fn decode(buf: &[u8]) -> Result<Option<(usize, usize)>> {
    let mut value = 0usize;

    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(Error::InvalidRemainingLength);
        }

        value |= ((byte & 0x7F) as usize) << (7 * i);

        if (byte & 0x80) == 0 {
            return Ok(Some((value, i + 1)));
        }
    }

    // Need more bytes
    Ok(None)
}

/// Encode `value` as a variable byte integer into `buf`.
///
/// Returns the number of bytes written.
///
/// # Example
/// ```
/// use mqcodec_core::varint::encode_to_slice;
/// let mut buf = [0u8; 4];
/// let written = encode_to_slice(128, &mut buf).unwrap();
/// assert_eq!(written, 2);
/// assert_eq!(&buf[..2], &[0x80, 0x01]);
/// ```
pub fn encode_to_slice(mut value: usize, buf: &mut [u8]) -> Result<usize> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::RemainingLengthTooLarge(value));
    }

    let needed = encoded_len(value);
    if buf.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            have: buf.len(),
        });
    }

    for slot in buf.iter_mut().take(needed) {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        *slot = byte;
    }
    Ok(needed)
}

/// Calculate the number of bytes needed to encode a value.
///
/// Values above [`MAX_REMAINING_LENGTH`] report five bytes; they cannot be
/// encoded.
///
/// # Example
/// ```
/// use mqcodec_core::varint::encoded_len;
/// assert_eq!(encoded_len(0), 1);
/// assert_eq!(encoded_len(127), 1);
/// assert_eq!(encoded_len(128), 2);
/// assert_eq!(encoded_len(16383), 2);
/// assert_eq!(encoded_len(16384), 3);
/// ```
pub fn encoded_len(mut value: usize) -> usize {
    let mut len = 0;
    loop {
        len += 1;
        value /= 128;
        if value == 0 {
            break;
        }
    }
    len
}
