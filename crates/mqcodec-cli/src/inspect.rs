//! Frames a byte stream and reports every packet in it.

use std::collections::BTreeMap;
use std::io::{self, Read, Write};

use log::{debug, trace};
use mqcodec_core::{Framer, Packet, Publish};

use crate::config::{Config, OutputConfig};
use crate::error::{CliError, Result};

/// Totals for one inspected stream.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub packets: usize,
    pub bytes: u64,
    pub per_type: BTreeMap<&'static str, usize>,
}

/// Read `input` to the end, writing one line per packet to `out`.
///
/// Stops at the first codec error; a malformed packet leaves no way to find
/// the next boundary.
pub fn inspect<R: Read, W: Write>(mut input: R, mut out: W, config: &Config) -> Result<Summary> {
    let mut framer = Framer::with_capacity(
        config.input.read_buffer_size,
        config.limits.to_limits(),
    );
    let mut chunk = vec![0u8; config.input.read_buffer_size];
    let mut summary = Summary::default();

    loop {
        let n = match input.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        trace!("read {} bytes", n);
        framer.extend(&chunk[..n]);

        loop {
            let offset = framer.position();
            let packet = match framer.next_packet() {
                Ok(Some(packet)) => packet,
                Ok(None) => break,
                Err(source) => return Err(CliError::Codec { offset, source }),
            };
            let len = framer.position() - offset;
            writeln!(out, "{}", report_line(offset, len, &packet, &config.output))?;

            summary.packets += 1;
            summary.bytes += len;
            *summary
                .per_type
                .entry(packet.packet_type().name())
                .or_default() += 1;
        }
    }

    if framer.buffered() > 0 {
        return Err(CliError::TruncatedStream {
            offset: framer.position(),
            buffered: framer.buffered(),
        });
    }

    out.flush()?;
    debug!("per type: {:?}", summary.per_type);
    Ok(summary)
}

fn report_line(offset: u64, len: u64, packet: &Packet, output: &OutputConfig) -> String {
    let id = packet
        .packet_id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "{:>8}  {:<11}  len={:<6}  id={:<5}  {}",
        offset,
        packet.packet_type(),
        len,
        id,
        describe(packet, output)
    )
}

fn describe(packet: &Packet, output: &OutputConfig) -> String {
    match packet {
        Packet::Publish(publish)
            if !output.show_payload || publish.payload.len() > output.max_payload_preview =>
        {
            let shown = if output.show_payload {
                publish.payload.slice(..output.max_payload_preview)
            } else {
                bytes::Bytes::new()
            };
            let preview = Publish {
                payload: shown,
                ..publish.clone()
            };
            format!("{} [{} bytes]", preview, publish.payload.len())
        }
        _ => packet.to_string(),
    }
}
