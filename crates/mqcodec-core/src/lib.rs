//! mqcodec-core - MQTT 3.1/3.1.1 packet codec.
//!
//! Encodes and decodes the fourteen MQTT control packets, detects packet
//! boundaries in a partially received stream, and frames a byte stream into
//! packets. No I/O happens here; transports hand in byte buffers.
//!
//! # Example
//!
//! ```
//! use mqcodec_core::{Packet, Publish, QoS};
//!
//! let publish = Publish {
//!     qos: QoS::AtLeastOnce,
//!     packet_id: Some(7),
//!     ..Publish::new("sensors/temp", "25.5")
//! };
//! let bytes = Packet::Publish(publish.clone()).encode_to_vec()?;
//!
//! let (decoded, consumed) = Packet::decode(&bytes)?;
//! assert_eq!(consumed, bytes.len());
//! assert_eq!(decoded, Packet::Publish(publish));
//! assert_eq!(decoded.packet_id(), Some(7));
//! # Ok::<(), mqcodec_core::Error>(())
//! ```

pub mod codec;
pub mod detect;
pub mod error;
pub mod header;
pub mod packet;
pub mod stream;
pub mod varint;

pub use codec::{QoS, QOS_FAILURE};
pub use detect::detect_packet;
pub use error::{Error, ErrorKind, Result};
pub use header::FixedHeader;
pub use packet::*;
pub use stream::{fuzz_decode, Framer, Limits};
